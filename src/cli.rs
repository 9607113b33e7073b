use crate::config::UrlOverrides;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "workflow-console",
    about = "Terminal console for managing and executing workflow records",
    version
)]
pub struct Cli {
    /// Launch URL handed over by the login system, e.g. `https://console.example.com/?token=...`
    pub launch_url: Option<String>,

    /// Path to the config file (default: ~/.config/workflow-console/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Base URL of the workflow service
    #[arg(long, value_name = "URL")]
    pub workflow_api: Option<String>,

    /// Base URL of the login service
    #[arg(long, value_name = "URL")]
    pub login_api: Option<String>,

    /// Login page to send users to when no valid token is available
    #[arg(long, value_name = "URL")]
    pub login_url: Option<String>,

    /// Forget the stored token and exit
    #[arg(long)]
    pub logout: bool,
}

impl Cli {
    pub fn url_overrides(&self) -> UrlOverrides {
        UrlOverrides {
            workflow_api_url: self.workflow_api.clone(),
            login_api_url: self.login_api.clone(),
            login_url: self.login_url.clone(),
        }
    }
}
