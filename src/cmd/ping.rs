use anyhow::Result;
use hchk::ping::TokioSleeper;
use hchk::workflow;
use tracing::debug;

use crate::cli::{Options, PingOptions};

pub async fn main(options: &Options, ping_options: &PingOptions) -> Result<()>
{
    let settings = options.settings(ping_options.api_key.as_deref())?;
    let spec = ping_options.spec();
    debug!(?settings, ?spec);

    workflow::ping(&settings, &spec, TokioSleeper).await?;

    Ok(())
}
