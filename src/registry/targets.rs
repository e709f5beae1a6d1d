//! Known CSDL targets and the filter kinds that may use them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub name: &'static str,
    pub interaction: bool,
    pub analysis: bool,
    pub query: bool,
}

const fn target(name: &'static str, interaction: bool, analysis: bool, query: bool) -> Target {
    Target {
        name,
        interaction,
        analysis,
        query,
    }
}

pub const TARGETS: &[Target] = &[
    target("fb.author.age", true, true, true),
    target("fb.author.country", true, true, true),
    target("fb.author.country_code", true, true, true),
    target("fb.author.gender", true, true, true),
    target("fb.author.region", true, true, true),
    target("fb.author.type", true, true, true),
    target("fb.content", true, false, true),
    target("fb.hashtags", true, true, true),
    target("fb.language", true, true, true),
    target("fb.link", true, true, true),
    target("fb.media_type", true, true, true),
    target("fb.parent.author.age", true, true, true),
    target("fb.parent.author.country", true, true, true),
    target("fb.parent.author.country_code", true, true, true),
    target("fb.parent.author.gender", true, true, true),
    target("fb.parent.author.type", true, true, true),
    target("fb.parent.content", true, false, true),
    target("fb.parent.hashtags", true, true, true),
    target("fb.parent.interface", true, true, true),
    target("fb.parent.language", true, true, true),
    target("fb.parent.link", true, true, true),
    target("fb.parent.media_type", true, true, true),
    target("fb.parent.sentiment", true, true, true),
    target("fb.parent.topics.about", true, false, false),
    target("fb.parent.topics.category", true, true, true),
    target("fb.parent.topics.company_overview", true, false, false),
    target("fb.parent.topics.location_city", true, false, false),
    target("fb.parent.topics.location_street", true, false, false),
    target("fb.parent.topics.mission", true, false, false),
    target("fb.parent.topics.name", true, true, true),
    target("fb.parent.topics.products", true, false, false),
    target("fb.parent.topics.release_date", true, false, false),
    target("fb.parent.topics.username", true, false, false),
    target("fb.parent.topics.website", true, false, false),
    target("fb.parent.topic_ids", true, true, true),
    target("fb.sentiment", true, true, true),
    target("fb.topics.about", true, false, false),
    target("fb.topics.category", true, true, true),
    target("fb.topics.company_overview", true, false, false),
    target("fb.topics.location_city", true, false, false),
    target("fb.topics.location_street", true, false, false),
    target("fb.topics.mission", true, false, false),
    target("fb.topics.name", true, true, true),
    target("fb.topics.products", true, false, false),
    target("fb.topics.release_date", true, false, false),
    target("fb.topics.username", true, false, false),
    target("fb.topics.website", true, false, false),
    target("fb.topic_ids", true, true, true),
    target("fb.type", true, true, true),
    target("interaction.content", true, false, true),
    target("interaction.hashtags", true, true, true),
    target("interaction.media_type", true, true, true),
    target("interaction.ml.categories", false, true, true),
    target("interaction.raw_content", true, false, true),
    target("interaction.subtype", true, true, true),
    target("interaction.tags", false, true, false),
    target("interaction.tag_tree", false, true, true),
    target("links.code", true, true, true),
    target("links.domain", true, true, true),
    target("links.normalized_url", true, true, true),
    target("links.url", true, true, true),
];

pub fn lookup(name: &str) -> Option<&'static Target> {
    TARGETS.iter().find(|t| t.name == name)
}

/// `interaction.tag_tree.<name>` targets are valid in query filters.
pub fn is_tag_tree_target(name: &str) -> bool {
    name.strip_prefix("interaction.tag_tree.")
        .is_some_and(|rest| !rest.is_empty())
}
