use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::check::{CachedCheck, CheckSpec};
use crate::ping::{PingResult, Pinger, Sleeper};
use crate::store::{Config, ConfigStore};
use crate::{http_client, Settings};


#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("API key is not set. Please set it with\n\n    hchk setkey YOUR_API_KEY\n")]
    MissingApiKey,
    #[error("unable to create check")]
    Create(#[source] ApiError),
    #[error("unable to ping {0}")]
    PingFailed(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}


/// Create the check described by `spec` if necessary, then ping it.
pub async fn ping<S: Sleeper>(settings: &Settings, spec: &CheckSpec, sleeper: S) -> Result<(), WorkflowError>
{
    let store = settings.store();
    let mut config = store.load()?;

    let api_key =
        match (&settings.api_key, config.api_key()) {
            (Some(api_key), _) => api_key.clone(),
            (None, Some(api_key)) => api_key.to_string(),
            (None, None) => return Err(WorkflowError::MissingApiKey),
        };

    let http = http_client()?;
    let api = ApiClient::new(http.clone(), &settings.api_url, &api_key);
    let pinger = Pinger::new(http, sleeper);

    PingWorkflow::new(store, api, pinger)
        .run(&mut config, spec).await
}


enum State {
    Resolving {
        /// Create a new check even if a cached one matches.
        stale: bool,
    },
    Pinging {
        check: CachedCheck,
        recreated: bool,
    },
}

pub struct PingWorkflow<S> {
    store: ConfigStore,
    api: ApiClient,
    pinger: Pinger<S>,
}

impl<S: Sleeper> PingWorkflow<S> {

    pub fn new(store: ConfigStore, api: ApiClient, pinger: Pinger<S>) -> Self
    {
        PingWorkflow { store, api, pinger }
    }

    /// If the service doesn't know the cached check anymore (e.g., it expired),
    /// the check is recreated and pinged once more.
    pub async fn run(&self, config: &mut Config, spec: &CheckSpec) -> Result<(), WorkflowError>
    {
        let mut state = State::Resolving { stale: false };
        loop {
            state =
                match state {
                    State::Resolving { stale } => {
                        let cached = if stale { None } else { config.find(spec).cloned() };
                        let check =
                            match cached {
                                Some(check) => {
                                    debug!("using cached check [{}]", check.section_id);
                                    check
                                }
                                None => self.create(config, spec).await?,
                            };
                        State::Pinging { check, recreated: stale }
                    }
                    State::Pinging { check, recreated } => {
                        match self.pinger.ping(&check.ping_url).await {
                            PingResult::Success => {
                                debug!("pinged check [{}]", check.section_id);
                                return Ok(());
                            }
                            PingResult::NotFound if !recreated => {
                                warn!("check [{}] does not exist anymore, recreating it", check.section_id);
                                State::Resolving { stale: true }
                            }
                            PingResult::NotFound | PingResult::Failed =>
                                return Err(WorkflowError::PingFailed(check.ping_url)),
                        }
                    }
                };
        }
    }

    async fn create(&self, config: &mut Config, spec: &CheckSpec) -> Result<CachedCheck, WorkflowError>
    {
        let ping_url = self.api.create_check(spec).await.map_err(WorkflowError::Create)?;
        let check = CachedCheck::new(ping_url, spec.clone())
            .map_err(|e| WorkflowError::Create(ApiError::MalformedResponse(format!("{:#}", e))))?;
        info!("created check [{}]: {}", check.section_id, check.ping_url);

        config.upsert(check.clone());
        self.store.save(config)?;
        Ok(check)
    }

}
