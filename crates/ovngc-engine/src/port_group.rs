//! Port group collection: one port group per network policy

use std::collections::HashSet;

use ovngc_common::Result;
use tracing::{debug, error, info};

use crate::context::GcContext;

/// Tear down port groups whose network policy no longer exists.
///
/// Port groups not created for a policy carry no owner and are left alone.
pub async fn gc_port_groups(ctx: &GcContext) -> Result<usize> {
    info!("start to gc network policy");

    let policies = ctx.snapshot.list_network_policies().await.inspect_err(|e| {
        error!(error = %e, "failed to list network policies");
    })?;
    let live: HashSet<String> = policies.iter().map(|np| np.key().to_string()).collect();

    let port_groups = ctx.sdn.list_port_groups().await.inspect_err(|e| {
        error!(error = %e, "failed to list port groups");
    })?;

    let mut deleted = 0;
    for pg in port_groups {
        let Some(owner) = &pg.policy else {
            debug!(port_group = %pg.name, "port group has no owning policy, skipping");
            continue;
        };
        let owner = owner.to_string();
        if live.contains(&owner) {
            continue;
        }
        info!(port_group = %pg.name, policy = %owner, "gc port group");
        ctx.teardown
            .delete_network_policy(&pg)
            .await
            .inspect_err(|e| {
                error!(policy = %owner, error = %e, "failed to gc np");
            })?;
        deleted += 1;
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockResourceSnapshot, MockSdnClient, MockTeardown};
    use crate::testing::{network_policy, ContextBuilder};
    use ovngc_common::keys::PolicyKey;
    use ovngc_common::model::PortGroup;
    use ovngc_common::Error;

    fn pg(name: &str, owner: Option<(&str, &str)>) -> PortGroup {
        PortGroup {
            name: name.to_string(),
            policy: owner.map(|(ns, n)| PolicyKey::new(ns, n)),
        }
    }

    #[tokio::test]
    async fn story_port_group_of_deleted_policy_is_torn_down() {
        let mut snapshot = MockResourceSnapshot::new();
        snapshot
            .expect_list_network_policies()
            .returning(|| Ok(vec![network_policy("default", "allow-web")]));

        let mut sdn = MockSdnClient::new();
        sdn.expect_list_port_groups().returning(|| {
            Ok(vec![
                pg("allow.web.default", Some(("default", "allow-web"))),
                pg("deny.all.prod", Some(("prod", "deny-all"))),
                pg("node_pg", None),
            ])
        });

        let mut teardown = MockTeardown::new();
        teardown
            .expect_delete_network_policy()
            .withf(|pg| pg.name == "deny.all.prod")
            .times(1)
            .returning(|_| Ok(()));

        let ctx = ContextBuilder::new()
            .snapshot(snapshot)
            .sdn(sdn)
            .teardown(teardown)
            .build();

        assert_eq!(gc_port_groups(&ctx).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn story_same_name_in_other_namespace_does_not_protect() {
        let mut snapshot = MockResourceSnapshot::new();
        snapshot
            .expect_list_network_policies()
            .returning(|| Ok(vec![network_policy("default", "deny-all")]));

        let mut sdn = MockSdnClient::new();
        sdn.expect_list_port_groups()
            .returning(|| Ok(vec![pg("deny.all.prod", Some(("prod", "deny-all")))]));

        let mut teardown = MockTeardown::new();
        teardown
            .expect_delete_network_policy()
            .times(1)
            .returning(|_| Ok(()));

        let ctx = ContextBuilder::new()
            .snapshot(snapshot)
            .sdn(sdn)
            .teardown(teardown)
            .build();

        assert_eq!(gc_port_groups(&ctx).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn story_policy_listing_failure_aborts() {
        let mut snapshot = MockResourceSnapshot::new();
        snapshot
            .expect_list_network_policies()
            .returning(|| Err(Error::internal("list_network_policies", "forbidden")));

        let ctx = ContextBuilder::new().snapshot(snapshot).build();
        assert!(gc_port_groups(&ctx).await.is_err());
    }
}
