// Static mapping from event type to broker topic.
//
// Topic names are a pure function of the event type's domain prefix
// ("user.registered.v1" -> "user-events"). Types without an explicit mapping
// route to the default topic so one unmapped type never blocks a batch; this
// is a publish-target fallback, not a deserialization fallback.

/// Publish target for event types with no explicit mapping.
pub const DEFAULT_TOPIC: &str = "unrouted-events";

pub fn topic_for(event_type: &str) -> &'static str {
    match event_type.split('.').next().unwrap_or_default() {
        "user" => "user-events",
        "role" => "role-events",
        "stock" => "stock-events",
        _ => DEFAULT_TOPIC,
    }
}

#[cfg(test)]
mod topics_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user.registered.v1", "user-events")]
    #[case("role.assigned.v1", "role-events")]
    #[case("role.permissions_elevated.v1", "role-events")]
    #[case("stock.level_changed.v1", "stock-events")]
    fn it_should_map_known_domains_to_their_topics(
        #[case] event_type: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(topic_for(event_type), expected);
    }

    #[rstest]
    #[case("billing.invoice_issued.v1")]
    #[case("")]
    fn it_should_route_unmapped_types_to_the_default_topic(#[case] event_type: &str) {
        assert_eq!(topic_for(event_type), DEFAULT_TOPIC);
    }
}
