//! The accumulating civic feedback form.
//!
//! Forms are immutable values round-tripped by the caller each turn; every
//! update goes through [`FeedbackForm::merge`], which never clears a field
//! that was already set.

use serde::{Deserialize, Serialize};

/// Category of a piece of civic feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// A request for the municipality to do something.
    Request,
    /// A question about municipal services.
    Question,
    /// Praise for something that works well.
    Praise,
}

impl Category {
    /// All category labels, in schema order.
    pub const ALL: [Category; 3] = [Category::Request, Category::Question, Category::Praise];

    /// The wire label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Request => "request",
            Category::Question => "question",
            Category::Praise => "praise",
        }
    }
}

/// The partial feedback record extracted from conversation so far.
///
/// All four fields start unset. The form is complete once every field holds
/// a non-empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackForm {
    /// Short title summarizing the feedback.
    pub title: Option<String>,
    /// Feedback category.
    pub category: Option<Category>,
    /// Full description of the matter.
    pub description: Option<String>,
    /// Free-text place the feedback concerns.
    pub place: Option<String>,
}

impl FeedbackForm {
    /// Creates a fully-empty form.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merges one turn's extracted values into this form.
    ///
    /// Per field, the patch wins iff it carries a non-empty value; an unset
    /// or blank patch field keeps the current value. Merging an empty patch
    /// is the identity.
    pub fn merge(&self, patch: &FormPatch) -> FeedbackForm {
        FeedbackForm {
            title: pick_text(&self.title, &patch.title),
            category: patch.category.or(self.category),
            description: pick_text(&self.description, &patch.description),
            place: pick_text(&self.place, &patch.place),
        }
    }

    /// Returns true iff all four fields are set to non-empty values.
    pub fn is_complete(&self) -> bool {
        is_set(&self.title)
            && self.category.is_some()
            && is_set(&self.description)
            && is_set(&self.place)
    }

    /// Field names still missing before the form is complete.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !is_set(&self.title) {
            missing.push("title");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        if !is_set(&self.description) {
            missing.push("description");
        }
        if !is_set(&self.place) {
            missing.push("place");
        }
        missing
    }
}

/// One turn's newly extracted field values.
///
/// Same shape as the form, but an unset field means "no new information this
/// turn", never "clear this field".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FormPatch {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub place: Option<String>,
}

impl FormPatch {
    /// Creates a patch carrying no new information.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no field carries a usable value.
    pub fn is_empty(&self) -> bool {
        !is_set(&self.title)
            && self.category.is_none()
            && !is_set(&self.description)
            && !is_set(&self.place)
    }
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn pick_text(current: &Option<String>, patch: &Option<String>) -> Option<String> {
    match patch {
        Some(value) if !value.trim().is_empty() => Some(value.clone()),
        _ => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn form(
        title: Option<&str>,
        category: Option<Category>,
        description: Option<&str>,
        place: Option<&str>,
    ) -> FeedbackForm {
        FeedbackForm {
            title: title.map(String::from),
            category,
            description: description.map(String::from),
            place: place.map(String::from),
        }
    }

    #[test]
    fn empty_form_is_incomplete() {
        assert!(!FeedbackForm::empty().is_complete());
        assert_eq!(
            FeedbackForm::empty().missing_fields(),
            vec!["title", "category", "description", "place"]
        );
    }

    #[test]
    fn full_form_is_complete() {
        let form = form(
            Some("broken street light"),
            Some(Category::Request),
            Some("the light at the corner is out"),
            Some("Chuo, Tokyo"),
        );
        assert!(form.is_complete());
        assert!(form.missing_fields().is_empty());
    }

    #[test]
    fn any_missing_field_leaves_form_incomplete() {
        let base = form(
            Some("t"),
            Some(Category::Praise),
            Some("d"),
            Some("p"),
        );

        let mut missing_title = base.clone();
        missing_title.title = None;
        assert!(!missing_title.is_complete());

        let mut missing_category = base.clone();
        missing_category.category = None;
        assert!(!missing_category.is_complete());

        let mut missing_description = base.clone();
        missing_description.description = None;
        assert!(!missing_description.is_complete());

        let mut missing_place = base;
        missing_place.place = None;
        assert!(!missing_place.is_complete());
    }

    #[test]
    fn whitespace_only_field_counts_as_unset() {
        let form = form(Some("   "), Some(Category::Request), Some("d"), Some("p"));
        assert!(!form.is_complete());
        assert_eq!(form.missing_fields(), vec!["title"]);
    }

    #[test]
    fn merge_overwrites_with_non_empty_patch_values() {
        let prior = form(Some("old title"), None, Some("old description"), None);
        let patch = FormPatch {
            title: Some("new title".to_string()),
            category: Some(Category::Question),
            place: Some("Shibuya".to_string()),
            ..Default::default()
        };

        let merged = prior.merge(&patch);
        assert_eq!(merged.title.as_deref(), Some("new title"));
        assert_eq!(merged.category, Some(Category::Question));
        assert_eq!(merged.description.as_deref(), Some("old description"));
        assert_eq!(merged.place.as_deref(), Some("Shibuya"));
    }

    #[test]
    fn merge_with_empty_patch_is_identity() {
        let prior = form(
            Some("title"),
            Some(Category::Praise),
            Some("description"),
            Some("place"),
        );
        assert_eq!(prior.merge(&FormPatch::empty()), prior);
    }

    #[test]
    fn blank_patch_value_never_clears_a_set_field() {
        let prior = form(Some("kept"), Some(Category::Request), None, None);
        let patch = FormPatch {
            title: Some("   ".to_string()),
            ..Default::default()
        };

        let merged = prior.merge(&patch);
        assert_eq!(merged.title.as_deref(), Some("kept"));
        assert_eq!(merged.category, Some(Category::Request));
    }

    #[test]
    fn progressive_merge_reaches_completion() {
        let turn_one = FeedbackForm::empty().merge(&FormPatch {
            category: Some(Category::Request),
            description: Some("street light is out".to_string()),
            place: Some("Chuo, Tokyo".to_string()),
            ..Default::default()
        });
        assert!(!turn_one.is_complete());
        assert_eq!(turn_one.missing_fields(), vec!["title"]);

        let turn_two = turn_one.merge(&FormPatch {
            title: Some("broken street light".to_string()),
            ..Default::default()
        });
        assert!(turn_two.is_complete());
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Category::Request).unwrap(),
            "\"request\""
        );
        assert_eq!(
            serde_json::from_str::<Category>("\"praise\"").unwrap(),
            Category::Praise
        );
        assert!(serde_json::from_str::<Category>("\"complaint\"").is_err());
    }

    #[test]
    fn patch_rejects_unknown_keys() {
        let result = serde_json::from_str::<FormPatch>(r#"{"title":"t","extra":"x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn patch_is_empty_ignores_blank_strings() {
        assert!(FormPatch::empty().is_empty());
        let blank = FormPatch {
            description: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(blank.is_empty());
        let set = FormPatch {
            description: Some("something".to_string()),
            ..Default::default()
        };
        assert!(!set.is_empty());
    }

    fn optional_text() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[ a-zA-Z0-9]{0,12}")
    }

    fn optional_category() -> impl Strategy<Value = Option<Category>> {
        proptest::option::of(proptest::sample::select(Category::ALL.to_vec()))
    }

    fn arb_form() -> impl Strategy<Value = FeedbackForm> {
        (optional_text(), optional_category(), optional_text(), optional_text()).prop_map(
            |(title, category, description, place)| FeedbackForm {
                title,
                category,
                description,
                place,
            },
        )
    }

    fn arb_patch() -> impl Strategy<Value = FormPatch> {
        (optional_text(), optional_category(), optional_text(), optional_text()).prop_map(
            |(title, category, description, place)| FormPatch {
                title,
                category,
                description,
                place,
            },
        )
    }

    proptest! {
        // Per text field: a non-blank patch value wins, anything else keeps the prior value.
        #[test]
        fn merge_is_monotonic(form in arb_form(), patch in arb_patch()) {
            let merged = form.merge(&patch);

            for (merged_field, prior_field, patch_field) in [
                (&merged.title, &form.title, &patch.title),
                (&merged.description, &form.description, &patch.description),
                (&merged.place, &form.place, &patch.place),
            ] {
                match patch_field {
                    Some(v) if !v.trim().is_empty() => prop_assert_eq!(merged_field, patch_field),
                    _ => prop_assert_eq!(merged_field, prior_field),
                }
            }

            match patch.category {
                Some(c) => prop_assert_eq!(merged.category, Some(c)),
                None => prop_assert_eq!(merged.category, form.category),
            }
        }

        #[test]
        fn merge_never_unsets_a_field(form in arb_form(), patch in arb_patch()) {
            let merged = form.merge(&patch);
            prop_assert!(!(is_set(&form.title) && !is_set(&merged.title)));
            prop_assert!(!(form.category.is_some() && merged.category.is_none()));
            prop_assert!(!(is_set(&form.description) && !is_set(&merged.description)));
            prop_assert!(!(is_set(&form.place) && !is_set(&merged.place)));
        }

        #[test]
        fn empty_patch_is_identity(form in arb_form()) {
            prop_assert_eq!(form.merge(&FormPatch::empty()), form);
        }
    }
}
