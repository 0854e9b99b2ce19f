//! Performance profiling utilities.
//!
//! The timers only exist when the `perf_stats` feature is enabled; otherwise
//! `#[profile]` leaves the function body untouched.

pub use flowcrowd_macros::profile;

/// Last path segment of a type name with generic arguments removed, e.g.
/// `Crowd` for `flowcrowd::crowd::Crowd<bevy_ecs::entity::Entity>`.
pub fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_type_name_strips_path_and_generics() {
        assert_eq!(short_type_name("flowcrowd::crowd::pool::FieldPool"), "FieldPool");
        assert_eq!(
            short_type_name("flowcrowd::crowd::avoidance::registry::Crowd<bevy_ecs::entity::Entity>"),
            "Crowd"
        );
        assert_eq!(short_type_name("Crowd<u32>"), "Crowd");
        assert_eq!(
            short_type_name(std::any::type_name::<crate::crowd::Crowd<u32>>()),
            "Crowd"
        );
    }
}
