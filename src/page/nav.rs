//! Per-page navigation: the flat link bar and the categorized dropdown.
//!
//! Both generators are pure; the build loop persists their output through
//! the write gate so navigation fragments are reusable between runs.

use std::collections::BTreeMap;
use std::fmt::Write;

use super::PageName;

/// One classification rule: a slug predicate plus the category it selects.
#[derive(Debug, Clone, Copy)]
pub enum CategoryRule {
    /// Slug equals this value exactly.
    Exact(&'static str),
    /// Slug contains any of these needles.
    ContainsAny(&'static [&'static str]),
}

impl CategoryRule {
    pub fn matches(&self, slug: &str) -> bool {
        match self {
            CategoryRule::Exact(exact) => slug == *exact,
            CategoryRule::ContainsAny(needles) => {
                needles.iter().any(|needle| slug.contains(needle))
            }
        }
    }
}

/// Classification rules in precedence order; the first match wins.
pub const CATEGORY_RULES: [(CategoryRule, &str); 5] = [
    (CategoryRule::Exact("glossary"), "Glossary"),
    (
        CategoryRule::ContainsAny(&["presentation", "finding", "associa"]),
        "Rapid Review",
    ),
    (
        CategoryRule::ContainsAny(&["hla", "cytokine", "autoantibodies", "cd"]),
        "Immune",
    ),
    (
        CategoryRule::ContainsAny(&["cardio", "respiratory", "embryo"]),
        "System",
    ),
    (CategoryRule::ContainsAny(&["pharm"]), "Reference"),
];

/// Category for pages no rule claims.
pub const DEFAULT_CATEGORY: &str = "Misc";

/// Category a slug belongs to, by first matching rule.
pub fn categorize(slug: &str) -> &'static str {
    CATEGORY_RULES
        .iter()
        .find(|(rule, _)| rule.matches(slug))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Centered link bar to every other page, in corpus order.
pub fn flat_nav(current: &PageName, pages: &[PageName]) -> String {
    let links: Vec<String> = pages
        .iter()
        .filter(|page| page.slug != current.slug)
        .map(|page| {
            format!(
                "<a href=\"../pages/{}.html\" class=\"nav-link\">{}</a>",
                page.slug, page.label
            )
        })
        .collect();

    format!(
        "<nav style='margin: 10px 0;'>\n<div style=\"text-align: center;\">{}</div>\n</nav>\n",
        links.join(" | ")
    )
}

/// Categorized dropdown contents for one page.
///
/// The page's own category is always present, even when it holds no
/// links. Categories render sorted by name, links within a category
/// sorted by label. Glossary is a direct link rather than a submenu;
/// on the glossary page itself the link is replaced by a bare label so
/// no page ever links to itself.
pub fn drop_nav(current: &PageName, pages: &[PageName]) -> String {
    let mut categories: BTreeMap<&'static str, Vec<&PageName>> = BTreeMap::new();
    categories.entry(categorize(&current.slug)).or_default();

    for page in pages {
        if page.slug == current.slug {
            continue;
        }
        categories
            .entry(categorize(&page.slug))
            .or_default()
            .push(page);
    }

    let mut out = String::from("<div class=\"nav_dropdown_container\" id=\"nav-dropdown\">\n");

    for (category, mut links) in categories {
        let category_id = format!("category-{}", category.to_lowercase().replace(' ', "-"));

        if category == "Glossary" {
            writeln!(out, "      <!-- {category}: label (no direct link) -->").unwrap();
            writeln!(out, "      <div class=\"nav_category\" id=\"{category_id}\">").unwrap();
            if current.slug == "glossary" {
                writeln!(out, "        <span>{category}</span>").unwrap();
            } else {
                writeln!(
                    out,
                    "        <a class=\"nav_category_link\" href=\"../pages/glossary.html\">{category}</a>"
                )
                .unwrap();
            }
            writeln!(out, "      </div>").unwrap();
        } else {
            links.sort_by(|a, b| {
                (a.label.as_str(), a.slug.as_str()).cmp(&(b.label.as_str(), b.slug.as_str()))
            });
            writeln!(out, "      <!-- {category}: submenu -->").unwrap();
            writeln!(out, "      <div class=\"nav_category has-children\" id=\"{category_id}\">")
                .unwrap();
            writeln!(out, "        <span>{category}</span>").unwrap();
            writeln!(out, "        <div class=\"nav_submenu\">").unwrap();
            for page in links {
                writeln!(
                    out,
                    "          <a class=\"nav_link_tab\" href=\"../pages/{}.html\">{}</a>",
                    page.slug, page.label
                )
                .unwrap();
            }
            writeln!(out, "        </div>").unwrap();
            writeln!(out, "      </div>").unwrap();
        }
    }

    out.push_str("    </div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(label: &str, slug: &str) -> PageName {
        PageName {
            label: label.to_string(),
            slug: slug.to_string(),
        }
    }

    fn sample_pages() -> Vec<PageName> {
        vec![
            page("CD Markers", "cd-markers"),
            page("Findings", "findings"),
            page("Glossary", "glossary"),
            page("Cardiology", "cardiology"),
            page("Pharm Agents", "pharm-agents"),
            page("OMM", "omm"),
        ]
    }

    #[test]
    fn test_categorize_rules() {
        assert_eq!(categorize("glossary"), "Glossary");
        assert_eq!(categorize("findings"), "Rapid Review");
        assert_eq!(categorize("associations"), "Rapid Review");
        assert_eq!(categorize("cd-markers"), "Immune");
        assert_eq!(categorize("cardiology"), "System");
        assert_eq!(categorize("pharm-agents"), "Reference");
        assert_eq!(categorize("omm"), "Misc");
    }

    #[test]
    fn test_categorize_first_match_wins() {
        // Contains both a Rapid Review needle and an Immune needle; the
        // earlier rule claims it.
        assert_eq!(categorize("cd-presentations"), "Rapid Review");
    }

    #[test]
    fn test_flat_nav_excludes_self_keeps_corpus_order() {
        let pages = sample_pages();
        let nav = flat_nav(&pages[1], &pages);

        assert!(nav.starts_with("<nav style='margin: 10px 0;'>\n"));
        assert!(nav.ends_with("</nav>\n"));
        assert!(!nav.contains("findings.html"));

        let cd = nav.find("cd-markers.html").unwrap();
        let glossary = nav.find("glossary.html").unwrap();
        let omm = nav.find("omm.html").unwrap();
        assert!(cd < glossary && glossary < omm);
        assert_eq!(nav.matches(" | ").count(), 4);
    }

    #[test]
    fn test_drop_nav_categories_sorted_and_grouped() {
        let pages = sample_pages();
        let nav = drop_nav(&pages[5], &pages);

        assert!(nav.starts_with("<div class=\"nav_dropdown_container\" id=\"nav-dropdown\">"));
        assert!(nav.ends_with("    </div>"));

        let order: Vec<_> = ["Glossary", "Immune", "Misc", "Rapid Review", "Reference", "System"]
            .iter()
            .map(|category| nav.find(&format!("<!-- {category}")).unwrap())
            .collect();
        let mut sorted = order.clone();
        sorted.sort_unstable();
        assert_eq!(order, sorted);

        assert!(nav.contains(
            "<a class=\"nav_category_link\" href=\"../pages/glossary.html\">Glossary</a>"
        ));
        assert!(nav.contains("id=\"category-rapid-review\""));
        assert!(nav.contains(
            "<a class=\"nav_link_tab\" href=\"../pages/cd-markers.html\">CD Markers</a>"
        ));
    }

    #[test]
    fn test_drop_nav_own_category_present_when_empty() {
        let pages = vec![page("OMM", "omm"), page("Glossary", "glossary")];
        let nav = drop_nav(&pages[0], &pages);

        // No other Misc page exists, yet the group renders.
        assert!(nav.contains("<!-- Misc: submenu -->"));
        assert!(nav.contains("id=\"category-misc\""));
    }

    #[test]
    fn test_drop_nav_never_links_self() {
        let pages = sample_pages();
        for current in &pages {
            let nav = drop_nav(current, &pages);
            assert!(
                !nav.contains(&format!("href=\"../pages/{}.html\"", current.slug)),
                "nav for {} links itself",
                current.slug
            );
        }
    }

    #[test]
    fn test_glossary_page_gets_label_without_link() {
        let pages = sample_pages();
        let nav = drop_nav(&pages[2], &pages);
        assert!(nav.contains("<span>Glossary</span>"));
        assert!(!nav.contains("nav_category_link"));
    }
}
