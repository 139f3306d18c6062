use crate::devops::{DevOpsClient, Pool};
use tracing::{debug, error, warn};

/// Resolve configured pool names to the pools the service knows about.
///
/// Matching is exact and case-sensitive. Any failure of the listing call is
/// logged and yields an empty set, which ends the cycle.
pub async fn resolve_pools(client: &dyn DevOpsClient, names: &[String]) -> Vec<Pool> {
    let all = match client.list_pools().await {
        Ok(pools) => pools,
        Err(e) => {
            error!(error = %e, "Could not get pool information");
            return Vec::new();
        }
    };

    let resolved: Vec<Pool> = all
        .into_iter()
        .filter(|pool| names.iter().any(|name| name == &pool.name))
        .collect();

    for name in names {
        if !resolved.iter().any(|pool| &pool.name == name) {
            warn!(pool_name = %name, "Configured pool not found");
        }
    }

    debug!(count = resolved.len(), "Resolved pools");
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devops::fake::FakeDevOps;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_filters_to_configured_names() {
        let client = FakeDevOps::with_pools(&[(1, "Default"), (2, "Linux"), (3, "Windows")]);
        let pools = resolve_pools(&client, &names(&["Linux", "Windows", "Missing"])).await;
        let ids: Vec<i64> = pools.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_match_is_case_sensitive() {
        let client = FakeDevOps::with_pools(&[(1, "Linux")]);
        assert!(resolve_pools(&client, &names(&["linux"])).await.is_empty());
    }

    #[tokio::test]
    async fn test_listing_failure_yields_empty_set() {
        let client = FakeDevOps::default();
        assert!(resolve_pools(&client, &names(&["Linux"])).await.is_empty());
    }
}
