//! Singleton content records.
//!
//! Informational pages are edited from the admin area and stored under a
//! fixed key. Each kind ships a fully populated default so the page renders
//! with no backend at all.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::entity::{ValidationError, require_text};

/// A singleton content area.
pub trait ContentKind:
    Serialize + DeserializeOwned + Clone + Default + std::fmt::Debug + Send + Sync + 'static
{
    /// Fixed document key.
    const KEY: &'static str;

    /// Check every field before a write.
    ///
    /// # Errors
    ///
    /// Returns the first blank field.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Text content of the about page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AboutContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub philosophy_title: String,
    pub philosophy_content: String,
    pub philosophy_content2: String,
    pub process_title: String,
    pub process_content: String,
    pub process_image_alt: String,
    pub values_title: String,
    pub quality_title: String,
    pub quality_content: String,
    pub sustainability_title: String,
    pub sustainability_content: String,
    pub authenticity_title: String,
    pub authenticity_content: String,
}

impl AboutContent {
    fn fields(&self) -> [(&'static str, &str); 15] {
        [
            ("heroTitle", &self.hero_title),
            ("heroSubtitle", &self.hero_subtitle),
            ("philosophyTitle", &self.philosophy_title),
            ("philosophyContent", &self.philosophy_content),
            ("philosophyContent2", &self.philosophy_content2),
            ("processTitle", &self.process_title),
            ("processContent", &self.process_content),
            ("processImageAlt", &self.process_image_alt),
            ("valuesTitle", &self.values_title),
            ("qualityTitle", &self.quality_title),
            ("qualityContent", &self.quality_content),
            ("sustainabilityTitle", &self.sustainability_title),
            ("sustainabilityContent", &self.sustainability_content),
            ("authenticityTitle", &self.authenticity_title),
            ("authenticityContent", &self.authenticity_content),
        ]
    }
}

impl Default for AboutContent {
    fn default() -> Self {
        Self {
            hero_title: "About Our Ceramics".into(),
            hero_subtitle: "Discover the story behind our handcrafted pieces".into(),
            philosophy_title: "Our Philosophy".into(),
            philosophy_content: "We believe that the objects we use daily should be beautiful, \
                functional, and made with care. Our ceramics are created using traditional \
                techniques passed down through generations, combined with a modern minimalist \
                aesthetic."
                .into(),
            philosophy_content2: "Each piece tells a story of craftsmanship and attention to detail."
                .into(),
            process_title: "Our Process".into(),
            process_content: "From selecting the finest clay to the final firing, every step in \
                our process is carefully considered. We use sustainable practices and locally \
                sourced materials whenever possible."
                .into(),
            process_image_alt: "Ceramic making process".into(),
            values_title: "Our Values".into(),
            quality_title: "Quality".into(),
            quality_content: "We never compromise on quality. Every piece is carefully inspected \
                and finished to the highest standards."
                .into(),
            sustainability_title: "Sustainability".into(),
            sustainability_content: "We are committed to sustainable practices, using \
                eco-friendly materials and processes."
                .into(),
            authenticity_title: "Authenticity".into(),
            authenticity_content: "Each piece is handcrafted, making it unique and authentic - \
                no mass production here."
                .into(),
        }
    }
}

impl ContentKind for AboutContent {
    const KEY: &'static str = "about";

    fn validate(&self) -> Result<(), ValidationError> {
        self.fields()
            .into_iter()
            .try_for_each(|(name, value)| require_text(name, value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fully_populated() {
        let about = AboutContent::default();
        for (name, value) in about.fields() {
            assert!(!value.trim().is_empty(), "{name} is empty");
        }
        assert!(about.validate().is_ok());
        assert_eq!(about.hero_title, "About Our Ceramics");
    }

    #[test]
    fn test_validate_reports_blank_field() {
        let about = AboutContent {
            quality_content: String::new(),
            ..AboutContent::default()
        };
        assert_eq!(
            about.validate(),
            Err(ValidationError::Required("qualityContent"))
        );
    }

    #[test]
    fn test_partial_document_fills_from_defaults() {
        let about: AboutContent =
            serde_json::from_str(r#"{"heroTitle":"Clay and Fire"}"#).unwrap();
        assert_eq!(about.hero_title, "Clay and Fire");
        assert_eq!(about.values_title, "Our Values");
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let json = serde_json::to_value(AboutContent::default()).unwrap();
        assert!(json.get("philosophyContent2").is_some());
        assert!(json.get("processImageAlt").is_some());
    }
}
