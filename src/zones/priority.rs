// src/zones/priority.rs

/// Order zones for iteration: `own_zone` first when present, every other zone
/// in its original relative order. This is a stable partition, not a sort.
pub fn prioritize<'a, I>(zones: I, own_zone: &str) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let (mut ordered, others): (Vec<&str>, Vec<&str>) =
        zones.into_iter().partition(|zone| *zone == own_zone);
    ordered.extend(others);
    ordered
}
