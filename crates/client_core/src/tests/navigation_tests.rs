use super::*;

#[test]
fn parses_trailing_item_segment() {
    assert_eq!(parse_deep_link("/pokedex/45", DEFAULT_ROUTE_PREFIX), Some(ItemId(45)));
    assert_eq!(parse_deep_link("/pokedex/7/", DEFAULT_ROUTE_PREFIX), Some(ItemId(7)));
    assert_eq!(
        parse_deep_link("/pokedex/131?tab=stats#top", DEFAULT_ROUTE_PREFIX),
        Some(ItemId(131))
    );
}

#[test]
fn list_route_is_not_a_deep_link() {
    assert_eq!(parse_deep_link("/pokedex", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/pokedex/", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/", DEFAULT_ROUTE_PREFIX), None);
}

#[test]
fn rejects_non_positive_or_non_numeric_segments() {
    assert_eq!(parse_deep_link("/pokedex/0", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/pokedex/-3", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/pokedex/+3", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/pokedex/pikachu", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/pokedex/4/stats", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(
        parse_deep_link("/pokedex/99999999999", DEFAULT_ROUTE_PREFIX),
        None
    );
}

#[test]
fn requires_exact_route_prefix() {
    assert_eq!(parse_deep_link("/pokedex12", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/other/12", DEFAULT_ROUTE_PREFIX), None);
    assert_eq!(parse_deep_link("/dex/12", "/dex/"), Some(ItemId(12)));
}

#[test]
fn builds_item_path_under_prefix() {
    assert_eq!(item_path(DEFAULT_ROUTE_PREFIX, ItemId(25)), "/pokedex/25");
    assert_eq!(item_path("/dex/", ItemId(1)), "/dex/1");
}
