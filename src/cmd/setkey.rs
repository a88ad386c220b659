use anyhow::Result;

use crate::cli::{Options, SetkeyOptions};

pub fn main(options: &Options, setkey_options: &SetkeyOptions) -> Result<()>
{
    let settings = options.settings(None)?;
    settings.store().set_api_key(&setkey_options.api_key)?;

    println!("API key saved!");

    Ok(())
}
