//! Sovereign-cloud endpoint table.

use purviewx_types::CloudEnvironment;
use purviewx_types::wizard::ParseCloudError;

/// Environment variable selecting the tenant cloud.
pub const CLOUD_ENV_VAR: &str = "PURVIEWX_CLOUD";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloudEndpoints {
    pub authority: &'static str,
    pub token_endpoint: &'static str,
    pub graph: &'static str,
    /// Compliance PowerShell URI; only the US government high clouds publish one.
    pub ipps: Option<&'static str>,
}

const COMMERCIAL: CloudEndpoints = CloudEndpoints {
    authority: "https://login.microsoftonline.com",
    token_endpoint: "https://login.microsoftonline.com/common/oauth2/v2.0/token",
    graph: "https://graph.microsoft.com",
    ipps: None,
};

const US_GOV_AUTHORITY: &str = "https://login.microsoftonline.us";
const US_GOV_TOKEN: &str = "https://login.microsoftonline.us/common/oauth2/v2.0/token";
const US_GOV_GRAPH: &str = "https://graph.microsoft.us";

pub fn endpoints(cloud: CloudEnvironment) -> CloudEndpoints {
    match cloud {
        CloudEnvironment::Commercial => COMMERCIAL,
        CloudEnvironment::Gcc => CloudEndpoints {
            authority: US_GOV_AUTHORITY,
            token_endpoint: US_GOV_TOKEN,
            graph: US_GOV_GRAPH,
            ipps: None,
        },
        CloudEnvironment::GccHigh => CloudEndpoints {
            authority: US_GOV_AUTHORITY,
            token_endpoint: US_GOV_TOKEN,
            graph: US_GOV_GRAPH,
            ipps: Some("https://ps.compliance.protection.office365.us/powershell-liveid/"),
        },
        CloudEnvironment::Dod => CloudEndpoints {
            authority: US_GOV_AUTHORITY,
            token_endpoint: US_GOV_TOKEN,
            graph: US_GOV_GRAPH,
            ipps: Some("https://l5.ps.compliance.protection.office365.us/powershell-liveid/"),
        },
    }
}

/// Parse a `PURVIEWX_CLOUD` value. `None` means the variable is unset.
pub fn cloud_from_env_value(value: Option<&str>) -> Result<Option<CloudEnvironment>, ParseCloudError> {
    match value {
        None => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}
