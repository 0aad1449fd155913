//! # Community directory: listings, filters and pagination
//!
//! Pure, synchronous half of the directory pipeline. The async half (fetching
//! records and member counts) lives in `api::directory` and hands its result
//! to [`Listing::from_community`].
//!
//! ```text
//! Community rows ──► Listing (icon, LANGUAGE, image fallback, members)
//!                        │
//!          FilterState ──┤  category AND language AND text
//!                        ▼
//!                  filtered listings ──► page slice (PAGE_SIZE = 6)
//! ```
//!
//! [`RequestGeneration`] guards the async half: only the newest fetch may
//! publish its canonical list.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::models::Community;

/// Sentinel filter value that disables a predicate.
pub const ALL: &str = "all";

/// Fixed number of cards per page.
pub const PAGE_SIZE: usize = 6;

/// Shown when a community has no banner.
pub const FALLBACK_IMAGE: &str =
    "https://images.unsplash.com/photo-1488590528505-98d2b5aba04b?auto=format&fit=crop&w=800&q=80";

/// Icon shown next to a community title, resolved from its category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CategoryIcon {
    Star,
    Heart,
    Music,
    Money,
    Spirit,
    Monitor,
    Sports,
    Book,
    Gamepad,
    Palette,
    Plane,
    Food,
    School,
    Briefcase,
    Film,
    Users,
}

/// A selectable category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: CategoryIcon,
}

/// A selectable community language.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Language {
    pub id: &'static str,
    pub label: &'static str,
    pub flag: &'static str,
}

/// Categories offered by the filter bar and the creation form. The first entry
/// is the `all` sentinel and is never stored on a record.
pub const CATEGORIES: &[Category] = &[
    Category { id: ALL, label: "All", icon: CategoryIcon::Star },
    Category { id: "hobbies", label: "Hobbies", icon: CategoryIcon::Heart },
    Category { id: "music", label: "Music", icon: CategoryIcon::Music },
    Category { id: "money", label: "Money", icon: CategoryIcon::Money },
    Category { id: "spirituality", label: "Spirituality", icon: CategoryIcon::Spirit },
    Category { id: "tech", label: "Technology", icon: CategoryIcon::Monitor },
    Category { id: "health", label: "Health", icon: CategoryIcon::Heart },
    Category { id: "sports", label: "Sports", icon: CategoryIcon::Sports },
    Category { id: "self-improvement", label: "Self improvement", icon: CategoryIcon::Book },
    Category { id: "gaming", label: "Gaming", icon: CategoryIcon::Gamepad },
    Category { id: "art", label: "Art", icon: CategoryIcon::Palette },
    Category { id: "travel", label: "Travel", icon: CategoryIcon::Plane },
    Category { id: "food", label: "Food", icon: CategoryIcon::Food },
    Category { id: "education", label: "Education", icon: CategoryIcon::School },
    Category { id: "business", label: "Business", icon: CategoryIcon::Briefcase },
    Category { id: "entertainment", label: "Entertainment", icon: CategoryIcon::Film },
    Category { id: "other", label: "Other", icon: CategoryIcon::Users },
];

pub const LANGUAGES: &[Language] = &[
    Language { id: ALL, label: "All", flag: "🌐" },
    Language { id: "english", label: "English", flag: "🇺🇸" },
    Language { id: "arabic", label: "Arabic", flag: "🇸🇦" },
    Language { id: "spanish", label: "Spanish", flag: "🇪🇸" },
    Language { id: "french", label: "French", flag: "🇫🇷" },
    Language { id: "german", label: "German", flag: "🇩🇪" },
    Language { id: "chinese", label: "Chinese", flag: "🇨🇳" },
    Language { id: "japanese", label: "Japanese", flag: "🇯🇵" },
    Language { id: "korean", label: "Korean", flag: "🇰🇷" },
    Language { id: "russian", label: "Russian", flag: "🇷🇺" },
    Language { id: "other", label: "Other", flag: "🏳️" },
];

/// Category → icon. Unknown or missing categories get [`CategoryIcon::Users`].
pub fn category_icon(category: Option<&str>) -> CategoryIcon {
    let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) else {
        return CategoryIcon::Users;
    };
    CATEGORIES
        .iter()
        .skip(1)
        .find(|c| c.id.eq_ignore_ascii_case(category))
        .map(|c| c.icon)
        .unwrap_or(CategoryIcon::Users)
}

/// Human label for a stored category id, falling back to the raw value.
pub fn category_label(category: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|c| c.id.eq_ignore_ascii_case(category))
        .map(|c| c.label)
        .unwrap_or(category)
}

/// A community enriched for display. This is the element type of the
/// canonical list.
#[derive(Clone, Debug, PartialEq)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub icon: CategoryIcon,
    /// Uppercased language tag, empty when unknown.
    pub language: String,
    /// Banner URL or [`FALLBACK_IMAGE`].
    pub image: String,
    pub logo: Option<String>,
    pub price: Option<f64>,
    pub members: u64,
    pub max_members: Option<u32>,
}

impl Listing {
    pub fn from_community(community: &Community, members: u64) -> Self {
        let image = community
            .banner_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(FALLBACK_IMAGE)
            .to_string();

        Self {
            id: community.id.clone(),
            title: community.name.clone(),
            description: community.description.clone().unwrap_or_default(),
            category: community.category.clone(),
            icon: category_icon(community.category.as_deref()),
            language: community
                .language
                .as_deref()
                .unwrap_or_default()
                .trim()
                .to_uppercase(),
            image,
            logo: community.logo_url.clone(),
            price: community.membership_fee.filter(|fee| *fee > 0.0),
            members,
            max_members: community.max_members,
        }
    }

    pub fn is_full(&self) -> bool {
        self.max_members
            .is_some_and(|max| self.members >= u64::from(max))
    }
}

/// Category, language and text predicates plus the current page.
///
/// Every predicate setter resets the page to 1.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterState {
    category: String,
    language: String,
    query: String,
    page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category: ALL.to_string(),
            language: ALL.to_string(),
            query: String::new(),
            page: 1,
        }
    }
}

impl FilterState {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.page = 1;
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
        self.page = 1;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.page = 1;
    }

    /// Back to the first page. Called whenever a new canonical list is
    /// published. Returns whether the page changed.
    pub fn reset_page(&mut self) -> bool {
        let changed = self.page != 1;
        self.page = 1;
        changed
    }

    /// Move to `page` if it lies in `1..=total_pages`. Returns whether the
    /// page changed; out-of-range requests are ignored.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) -> bool {
        if page < 1 || page > total_pages || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    /// All active predicates, ANDed.
    pub fn matches(&self, listing: &Listing) -> bool {
        let category_ok = is_all(&self.category)
            || listing
                .category
                .as_deref()
                .is_some_and(|c| c.trim().eq_ignore_ascii_case(self.category.trim()));

        let language_ok =
            is_all(&self.language) || listing.language.eq_ignore_ascii_case(self.language.trim());

        let query = self.query.trim().to_lowercase();
        let text_ok = query.is_empty()
            || listing.title.to_lowercase().contains(&query)
            || listing.description.to_lowercase().contains(&query);

        category_ok && language_ok && text_ok
    }

    /// The filtered subset of `listings`, order preserved.
    pub fn apply(&self, listings: &[Listing]) -> Vec<Listing> {
        listings
            .iter()
            .filter(|listing| self.matches(listing))
            .cloned()
            .collect()
    }
}

fn is_all(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(ALL)
}

/// `ceil(len / PAGE_SIZE)`; zero for an empty list.
pub fn total_pages(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Items of 1-indexed `page`. Out-of-range pages yield an empty slice.
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// One rendered page of the directory.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView {
    pub items: Vec<Listing>,
    pub page: usize,
    pub total_pages: usize,
}

impl PageView {
    pub fn show_controls(&self) -> bool {
        self.total_pages > 1
    }
}

/// What the directory should render for a given canonical list and filters.
#[derive(Clone, Debug, PartialEq)]
pub enum DirectoryView {
    /// No communities exist at all.
    Empty,
    /// Communities exist but none match the filters.
    NoMatches,
    Page(PageView),
}

impl DirectoryView {
    pub fn compute(canonical: &[Listing], filters: &FilterState) -> Self {
        if canonical.is_empty() {
            return Self::Empty;
        }
        let filtered = filters.apply(canonical);
        if filtered.is_empty() {
            return Self::NoMatches;
        }
        let total = total_pages(filtered.len());
        let page = filters.page().clamp(1, total);
        Self::Page(PageView {
            items: page_slice(&filtered, page).to_vec(),
            page,
            total_pages: total,
        })
    }

    pub fn total_pages(&self) -> usize {
        match self {
            Self::Page(view) => view.total_pages,
            Self::Empty | Self::NoMatches => 0,
        }
    }
}

/// Identifies one directory fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Monotonic counter of directory fetches. Clones share the counter.
#[derive(Clone, Debug, Default)]
pub struct RequestGeneration {
    latest: Arc<AtomicU64>,
}

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch; every earlier ticket becomes stale.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Make every outstanding ticket stale without starting a fetch.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn community(id: &str, name: &str, category: &str, language: &str) -> Community {
        Community {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(format!("About {name}")),
            category: Some(category.to_string()),
            language: Some(language.to_string()),
            banner_url: None,
            logo_url: None,
            membership_fee: None,
            max_members: None,
            rules: None,
            video_embed: None,
            creator_id: "u1".to_string(),
            created_at: Utc::now(),
        }
    }

    fn listings(n: usize) -> Vec<Listing> {
        (0..n)
            .map(|i| Listing::from_community(&community(&i.to_string(), &format!("C{i}"), "tech", "english"), 0))
            .collect()
    }

    fn sample() -> Vec<Listing> {
        vec![
            Listing::from_community(&community("1", "Music Lovers", "music", "english"), 3),
            Listing::from_community(&community("2", "Tech Innovators", "tech", "English"), 10),
            Listing::from_community(&community("3", "Fitness Hub", "health", "arabic"), 0),
            Listing::from_community(&community("4", "Startup Founders", "business", "english"), 7),
            Listing::from_community(&community("5", "Mindfulness", "spirituality", "arabic"), 1),
        ]
    }

    #[test]
    fn test_listing_enrichment() {
        let mut c = community("1", "Rust", "TECH", " english ");
        c.membership_fee = Some(0.0);
        let listing = Listing::from_community(&c, 0);
        assert_eq!(listing.icon, CategoryIcon::Monitor);
        assert_eq!(listing.language, "ENGLISH");
        assert_eq!(listing.image, FALLBACK_IMAGE);
        assert_eq!(listing.members, 0);
        assert!(listing.price.is_none());

        c.banner_url = Some("https://cdn.test/banner.png".to_string());
        c.category = Some("knitting".to_string());
        let listing = Listing::from_community(&c, 2);
        assert_eq!(listing.image, "https://cdn.test/banner.png");
        assert_eq!(listing.icon, CategoryIcon::Users);
    }

    #[test]
    fn test_missing_category_maps_to_default_icon() {
        assert_eq!(category_icon(None), CategoryIcon::Users);
        assert_eq!(category_icon(Some("  ")), CategoryIcon::Users);
        assert_eq!(category_icon(Some("all")), CategoryIcon::Users);
        assert_eq!(category_icon(Some("Music")), CategoryIcon::Music);
    }

    #[test]
    fn test_is_full() {
        let mut c = community("1", "Small", "tech", "english");
        c.max_members = Some(2);
        assert!(!Listing::from_community(&c, 1).is_full());
        assert!(Listing::from_community(&c, 2).is_full());
        c.max_members = None;
        assert!(!Listing::from_community(&c, 500).is_full());
    }

    #[test]
    fn test_default_filters_match_everything() {
        let all = sample();
        assert_eq!(FilterState::default().apply(&all), all);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let all = sample();
        let mut filters = FilterState::default();

        filters.set_language("ENGLISH");
        let ids: Vec<_> = filters.apply(&all).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["1", "2", "4"]);

        filters.set_category("Tech");
        let ids: Vec<_> = filters.apply(&all).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["2"]);

        filters.set_category(ALL);
        filters.set_query("FOUNDERS");
        let ids: Vec<_> = filters.apply(&all).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["4"]);

        // Description match
        filters.set_language(ALL);
        filters.set_query("about fitness");
        let ids: Vec<_> = filters.apply(&all).into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["3"]);
    }

    #[test]
    fn test_filtered_list_is_exact_subset_for_all_combinations() {
        let all = sample();
        let categories = [ALL, "music", "tech", "health", "business", "spirituality", "none"];
        let languages = [ALL, "english", "arabic", "french"];
        let queries = ["", "hub", "o", "zzz"];

        for category in categories {
            for language in languages {
                for query in queries {
                    let mut filters = FilterState::default();
                    filters.set_category(category);
                    filters.set_language(language);
                    filters.set_query(query);

                    let expected: Vec<_> = all
                        .iter()
                        .filter(|l| {
                            (category == ALL
                                || l.category.as_deref().map(str::to_lowercase).as_deref() == Some(category))
                                && (language == ALL || l.language.to_lowercase() == language)
                                && (query.is_empty()
                                    || l.title.to_lowercase().contains(query)
                                    || l.description.to_lowercase().contains(query))
                        })
                        .cloned()
                        .collect();
                    assert_eq!(filters.apply(&all), expected, "{category}/{language}/{query}");
                }
            }
        }
    }

    #[test]
    fn test_changing_any_predicate_resets_page() {
        let mut filters = FilterState::default();
        assert!(filters.go_to_page(3, 5));
        filters.set_category("tech");
        assert_eq!(filters.page(), 1);

        filters.go_to_page(2, 5);
        filters.set_language("arabic");
        assert_eq!(filters.page(), 1);

        filters.go_to_page(2, 5);
        filters.set_query("x");
        assert_eq!(filters.page(), 1);
    }

    #[test]
    fn test_new_canonical_list_starts_on_first_page() {
        let mut filters = FilterState::default();
        assert!(filters.go_to_page(2, total_pages(10)));

        let reloaded = listings(10);
        assert!(filters.reset_page());
        assert!(!filters.reset_page());
        match DirectoryView::compute(&reloaded, &filters) {
            DirectoryView::Page(view) => {
                assert_eq!(view.page, 1);
                assert_eq!(view.items, reloaded[..PAGE_SIZE].to_vec());
            }
            other => panic!("expected a page, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_page_requests_are_noops() {
        let mut filters = FilterState::default();
        assert!(!filters.go_to_page(0, 3));
        assert!(!filters.go_to_page(4, 3));
        assert!(!filters.go_to_page(1, 0));
        assert_eq!(filters.page(), 1);
        assert!(filters.go_to_page(3, 3));
        assert_eq!(filters.page(), 3);
    }

    #[test]
    fn test_pages_cover_list_exactly_once() {
        for n in 0..=20 {
            let items = listings(n);
            let pages = total_pages(n);
            assert_eq!(pages, (n + PAGE_SIZE - 1) / PAGE_SIZE);

            let union: Vec<_> = (1..=pages)
                .flat_map(|p| page_slice(&items, p).iter().cloned())
                .collect();
            assert_eq!(union, items, "n = {n}");
            assert!(page_slice(&items, pages + 1).is_empty());
            assert!(page_slice(&items, 0).is_empty());
        }
    }

    #[test]
    fn test_empty_canonical_list() {
        let view = DirectoryView::compute(&[], &FilterState::default());
        assert_eq!(view, DirectoryView::Empty);
        assert_eq!(view.total_pages(), 0);
    }

    #[test]
    fn test_filtered_to_empty_is_distinct() {
        let mut filters = FilterState::default();
        filters.set_query("nothing matches this");
        let view = DirectoryView::compute(&sample(), &filters);
        assert_eq!(view, DirectoryView::NoMatches);
        assert_eq!(view.total_pages(), 0);
    }

    #[test]
    fn test_page_view_clamps_and_hides_single_page_controls() {
        let all = listings(8);
        let mut filters = FilterState::default();
        filters.go_to_page(2, 2);

        let DirectoryView::Page(view) = DirectoryView::compute(&all, &filters) else {
            panic!("expected a page");
        };
        assert_eq!(view.page, 2);
        assert_eq!(view.items.len(), 2);
        assert!(view.show_controls());

        // The canonical list shrank under the current page.
        let DirectoryView::Page(view) = DirectoryView::compute(&all[..3], &filters) else {
            panic!("expected a page");
        };
        assert_eq!(view.page, 1);
        assert_eq!(view.items.len(), 3);
        assert!(!view.show_controls());
    }

    #[test]
    fn test_zero_member_listing_still_renders() {
        let all = vec![Listing::from_community(&community("z", "Quiet", "art", "french"), 0)];
        let DirectoryView::Page(view) = DirectoryView::compute(&all, &FilterState::default()) else {
            panic!("expected a page");
        };
        assert_eq!(view.items[0].members, 0);
    }

    #[test]
    fn test_only_latest_ticket_is_current() {
        let generation = RequestGeneration::new();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.clone().begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));

        generation.invalidate();
        assert!(!generation.is_current(second));
    }
}
