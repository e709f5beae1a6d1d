//! Known CSDL operators.

pub const OPERATORS: &[&str] = &[
    "contains",
    "cs contains",
    "substr",
    "cs substr",
    "contains_any",
    "cs contains_any",
    "any",
    "cs any",
    "wildcard",
    "cs wildcard",
    "wild",
    "cs wild",
    "contains_all",
    "cs contains_all",
    "all",
    "cs all",
    "contains_near",
    "cs contains_near",
    "exists",
    "in",
    "url_in",
    "==",
    "!=",
    "cs ==",
    "cs !=",
    ">",
    ">=",
    "<",
    "<=",
    "regex_partial",
    "regex_exact",
    "geo_box",
    "geo_radius",
    "geo_polygon",
];

pub fn is_operator(name: &str) -> bool {
    OPERATORS.contains(&name)
}
