// src/backends/builder.rs
use super::descriptor::{BackendDescriptor, Snapshot};
use crate::config::WatcherConfig;
use crate::health::HealthyInstances;
use crate::zones::prioritize;

/// Turns zoned healthy instances into the ordered backend list.
#[derive(Debug, Clone)]
pub struct BackendListBuilder {
    own_zone: String,
    port: u16,
    prefer_same_zone: bool,
}

impl BackendListBuilder {
    pub fn new(own_zone: impl Into<String>, port: u16, prefer_same_zone: bool) -> Self {
        Self {
            own_zone: own_zone.into(),
            port,
            prefer_same_zone,
        }
    }

    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(config.own_zone.clone(), config.port, config.prefer_same_zone)
    }

    pub fn build(&self, healthy: &HealthyInstances) -> Snapshot {
        let mut backends = Vec::with_capacity(healthy.total());

        for zone in prioritize(healthy.zones(), &self.own_zone) {
            // any server not in our zone is a backup when same-zone is preferred
            let backup = self.prefer_same_zone && zone != self.own_zone;

            for instance in healthy.instances_in(zone) {
                let backend = BackendDescriptor::new(
                    instance.public_dns_name.clone(),
                    instance.private_ip_address.clone(),
                    self.port,
                );
                backends.push(if backup { backend.as_backup() } else { backend });
            }
        }

        backends
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::testing::{us_east_1b, us_east_1e};
    use crate::health::Instance;
    use proptest::prelude::*;

    fn scenario() -> HealthyInstances {
        vec![us_east_1b(), us_east_1e()].into_iter().collect()
    }

    #[test]
    fn test_build_without_zone_preference() {
        let builder = BackendListBuilder::new("us-east-1b", 9898, false);

        let backends = builder.build(&scenario());

        assert_eq!(
            backends,
            vec![
                BackendDescriptor::new("ec2-1-2-3-4.compute-1.amazonaws.com", "1.2.3.4", 9898),
                BackendDescriptor::new("ec2-5-6-7-8.compute-1.amazonaws.com", "5.6.7.8", 9898),
            ]
        );
        assert!(backends.iter().all(|b| b.backup.is_none()));
    }

    #[test]
    fn test_build_marks_other_zones_as_backup() {
        let builder = BackendListBuilder::new("us-east-1b", 9898, true);

        let backends = builder.build(&scenario());

        assert_eq!(backends[0].backup, None);
        assert_eq!(backends[1].backup, Some(true));
    }

    #[test]
    fn test_own_zone_comes_first_even_when_discovered_last() {
        let healthy: HealthyInstances = vec![us_east_1e(), us_east_1b()].into_iter().collect();
        let builder = BackendListBuilder::new("us-east-1b", 9898, false);

        let backends = builder.build(&healthy);

        assert_eq!(backends[0].host, "1.2.3.4");
        assert_eq!(backends[1].host, "5.6.7.8");
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = BackendListBuilder::new("us-east-1b", 9898, true);

        assert_eq!(builder.build(&scenario()), builder.build(&scenario()));
    }

    #[test]
    fn test_empty_health_map() {
        let builder = BackendListBuilder::new("us-east-1b", 9898, true);
        assert!(builder.build(&HealthyInstances::new()).is_empty());
    }

    fn instances_strategy() -> impl Strategy<Value = Vec<Instance>> {
        prop::collection::vec((0u8..4, 0u8..255), 0..20).prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (zone, octet))| Instance {
                    id: format!("i-{i:08x}"),
                    availability_zone: format!("us-east-1{}", (b'a' + zone) as char),
                    public_dns_name: format!("ec2-10-0-0-{octet}.compute-1.amazonaws.com"),
                    private_ip_address: format!("10.0.0.{octet}"),
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn backup_iff_preferred_and_foreign_zone(instances in instances_strategy(), prefer in any::<bool>()) {
            let healthy: HealthyInstances = instances.into_iter().collect();
            let builder = BackendListBuilder::new("us-east-1b", 9898, prefer);

            let backends = builder.build(&healthy);
            prop_assert_eq!(backends.len(), healthy.total());

            let mut index = 0;
            for zone in prioritize(healthy.zones(), "us-east-1b") {
                for _ in healthy.instances_in(zone) {
                    let expected = if prefer && zone != "us-east-1b" { Some(true) } else { None };
                    prop_assert_eq!(backends[index].backup, expected);
                    prop_assert_eq!(backends[index].port, 9898);
                    index += 1;
                }
            }
        }

        #[test]
        fn own_zone_backend_is_first(instances in instances_strategy()) {
            let healthy: HealthyInstances = instances.into_iter().collect();
            prop_assume!(!healthy.instances_in("us-east-1b").is_empty());
            let builder = BackendListBuilder::new("us-east-1b", 9898, false);

            let backends = builder.build(&healthy);

            prop_assert_eq!(&backends[0].host, &healthy.instances_in("us-east-1b")[0].private_ip_address);
        }
    }
}
