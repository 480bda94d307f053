use thiserror::Error;

use crate::config::Config;
use crate::image_types::Provider;

/// How a search request will be served: one upstream call, or the combined
/// Unsplash + Pixabay plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    Single(Provider),
    Combined,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("{credential} is required when provider={provider}")]
    MissingCredential {
        credential: &'static str,
        provider: &'static str,
    },
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),
}

fn credential_for(provider: Provider) -> &'static str {
    match provider {
        Provider::Pixabay => "PIXABAY_API_KEY",
        Provider::Unsplash => "UNSPLASH_ACCESS_KEY",
        Provider::Pinterest => "PINTEREST_ACCESS_TOKEN",
    }
}

fn has_credential(config: &Config, provider: Provider) -> bool {
    match provider {
        Provider::Pixabay => config.pixabay_api_key.is_some(),
        Provider::Unsplash => config.unsplash_access_key.is_some(),
        Provider::Pinterest => config.pinterest_access_token.is_some(),
    }
}

/// Resolve the provider plan for a request before any outbound call is made.
///
/// Precedence: explicit request parameter, then the USE_PIXABAY flag, then
/// Unsplash. A resolved provider whose credential is not configured is a
/// configuration error naming the missing variable, never a silent fallback
/// to another provider.
pub fn resolve_plan(param: Option<&str>, config: &Config) -> Result<Plan, PlanError> {
    let normalized = param.map(|p| p.trim().to_ascii_lowercase());

    let plan = match normalized.as_deref() {
        None | Some("") => Plan::Single(config.default_provider()),
        Some("both") | Some("pixabay+unsplash") | Some("unsplash+pixabay") => Plan::Combined,
        Some(name) => match name.parse::<Provider>() {
            Ok(provider) => Plan::Single(provider),
            Err(()) => return Err(PlanError::UnknownProvider(name.to_string())),
        },
    };

    match plan {
        Plan::Single(provider) => {
            if !has_credential(config, provider) {
                return Err(PlanError::MissingCredential {
                    credential: credential_for(provider),
                    provider: provider.as_str(),
                });
            }
        }
        Plan::Combined => {
            // Both legs must be configured up front; there is no degraded
            // single-provider fallback for the combined plan.
            for provider in [Provider::Unsplash, Provider::Pixabay] {
                if !has_credential(config, provider) {
                    return Err(PlanError::MissingCredential {
                        credential: credential_for(provider),
                        provider: "both",
                    });
                }
            }
        }
    }

    Ok(plan)
}

/// Default page size per plan. Single Pixabay keeps the original 20-hit page;
/// everything else pulls 10 per provider.
pub fn default_per_page(plan: Plan) -> u32 {
    match plan {
        Plan::Single(Provider::Pixabay) => 20,
        _ => 10,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn test_explicit_param_wins_over_flag() {
        let mut config = test_config();
        config.use_pixabay = true;

        assert_eq!(
            resolve_plan(Some("unsplash"), &config),
            Ok(Plan::Single(Provider::Unsplash))
        );
    }

    #[test]
    fn test_flag_selects_default() {
        let mut config = test_config();
        assert_eq!(
            resolve_plan(None, &config),
            Ok(Plan::Single(Provider::Unsplash))
        );

        config.use_pixabay = true;
        assert_eq!(
            resolve_plan(None, &config),
            Ok(Plan::Single(Provider::Pixabay))
        );
    }

    #[test]
    fn test_combined_aliases() {
        let config = test_config();
        for alias in ["both", "pixabay+unsplash", "unsplash+pixabay", "BOTH"] {
            assert_eq!(resolve_plan(Some(alias), &config), Ok(Plan::Combined));
        }
    }

    #[test]
    fn test_missing_credential_names_the_variable() {
        let mut config = test_config();
        config.pixabay_api_key = None;

        let err = resolve_plan(Some("pixabay"), &config).unwrap_err();
        assert_eq!(
            err,
            PlanError::MissingCredential {
                credential: "PIXABAY_API_KEY",
                provider: "pixabay",
            }
        );
        assert!(err.to_string().contains("PIXABAY_API_KEY"));
    }

    #[test]
    fn test_combined_requires_both_credentials() {
        let mut config = test_config();
        config.unsplash_access_key = None;
        let err = resolve_plan(Some("both"), &config).unwrap_err();
        assert!(err.to_string().contains("UNSPLASH_ACCESS_KEY"));

        let mut config = test_config();
        config.pixabay_api_key = None;
        let err = resolve_plan(Some("both"), &config).unwrap_err();
        assert!(err.to_string().contains("PIXABAY_API_KEY"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = test_config();
        assert_eq!(
            resolve_plan(Some("flickr"), &config),
            Err(PlanError::UnknownProvider("flickr".to_string()))
        );
    }

    #[test]
    fn test_per_page_defaults() {
        assert_eq!(default_per_page(Plan::Single(Provider::Pixabay)), 20);
        assert_eq!(default_per_page(Plan::Single(Provider::Unsplash)), 10);
        assert_eq!(default_per_page(Plan::Single(Provider::Pinterest)), 10);
        assert_eq!(default_per_page(Plan::Combined), 10);
    }
}
