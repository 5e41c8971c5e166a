// src/health/status.rs
use super::api::Instance;

/// Healthy instances of one availability zone, in API order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneGroup {
    pub zone: String,
    pub instances: Vec<Instance>,
}

/// Healthy instances grouped by zone. Zones keep first-seen order so that
/// iteration is deterministic for a given API response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthyInstances {
    groups: Vec<ZoneGroup>,
}

impl HealthyInstances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instance: Instance) {
        match self
            .groups
            .iter_mut()
            .find(|group| group.zone == instance.availability_zone)
        {
            Some(group) => group.instances.push(instance),
            None => self.groups.push(ZoneGroup {
                zone: instance.availability_zone.clone(),
                instances: vec![instance],
            }),
        }
    }

    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|group| group.zone.as_str())
    }

    pub fn instances_in(&self, zone: &str) -> &[Instance] {
        self.groups
            .iter()
            .find(|group| group.zone == zone)
            .map(|group| group.instances.as_slice())
            .unwrap_or(&[])
    }

    pub fn groups(&self) -> &[ZoneGroup] {
        &self.groups
    }

    pub fn total(&self) -> usize {
        self.groups.iter().map(|group| group.instances.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<Instance> for HealthyInstances {
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        let mut healthy = Self::new();
        for instance in iter {
            healthy.insert(instance);
        }
        healthy
    }
}
