/// Names the host page and its fragments use for the structural contract.
///
/// The defaults describe pages written as:
///
/// ```html
/// <math-exercise>
///   <nav data-region="header"/>
///   <section data-region="content"/>
///   <nav data-region="footer"/>
/// </math-exercise>
/// <template id="1a"><p><span data-placeholder=""/> + <span data-placeholder=""/></p></template>
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conventions {
    /// Tag of the element that hosts the three render regions.
    pub component_tag: String,
    /// Attribute whose value (`content`, `header`, `footer`) marks a region.
    pub region_attribute: String,
    /// Tag of fragment declarations; its content is inert.
    pub template_tag: String,
    /// Attribute on a fragment declaration holding its exercise id.
    pub id_attribute: String,
    /// Attribute marking a numeric slot inside a fragment.
    pub placeholder_attribute: String,
    /// Query parameter carrying the active exercise id.
    pub parameter: String,
}

impl Default for Conventions {
    fn default() -> Self {
        Self {
            component_tag: "math-exercise".to_string(),
            region_attribute: "data-region".to_string(),
            template_tag: "template".to_string(),
            id_attribute: "id".to_string(),
            placeholder_attribute: "data-placeholder".to_string(),
            parameter: "exercise".to_string(),
        }
    }
}
