use crate::error::RegistryError;
use crate::flow::{FlowDefinition, ValidationReport};
use crate::formats::{DotFormat, FlowFormat, JsonFormat, MermaidFormat, PlantUmlFormat};

/// Detectors scoring below this are treated as "no signal".
pub const MIN_CONFIDENCE: f64 = 0.1;

/// The identifier reported when no detector recognizes the input.
pub const UNKNOWN_FORMAT: &str = "unknown";

/// Result of running every registered detector against a text.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub format: String,
    pub confidence: f64,
}

impl Detection {
    fn unknown() -> Self {
        Self {
            format: UNKNOWN_FORMAT.to_string(),
            confidence: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.format == UNKNOWN_FORMAT
    }
}

/// Successful registry parse: the flow plus which format produced it.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub flow: FlowDefinition,
    pub format: String,
    pub warnings: Vec<String>,
}

struct RegisteredFormat {
    format: Box<dyn FlowFormat>,
    source_label: String,
}

/// Catalog of installed formats, mediating detection and parser dispatch.
///
/// An explicit value the host constructs and passes around — formats are
/// registered by the caller, never by import-time side effects. Backed by a
/// `Vec` so iteration order is registration order, which makes detection
/// tie-breaking deterministic.
#[derive(Default)]
pub struct FormatRegistry {
    formats: Vec<RegisteredFormat>,
}

impl FormatRegistry {
    /// An empty registry; callers register formats themselves.
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// A registry with the four builtin formats, registered in the fixed
    /// order json, dot, mermaid, plantuml under the `"builtin"` label.
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        // Registration of fresh formats into an empty registry cannot fail.
        let _ = registry.register(Box::new(JsonFormat::new()), "builtin");
        let _ = registry.register(Box::new(DotFormat::new()), "builtin");
        let _ = registry.register(Box::new(MermaidFormat::new()), "builtin");
        let _ = registry.register(Box::new(PlantUmlFormat::new()), "builtin");
        registry
    }

    /// Install a format implementation. Re-registering an id from the same
    /// source label is an idempotent no-op (repeated host initialization is
    /// tolerated); registering it from a different source is an error.
    pub fn register(
        &mut self,
        format: Box<dyn FlowFormat>,
        source_label: &str,
    ) -> Result<(), RegistryError> {
        if let Some(existing) = self.formats.iter().find(|f| f.format.id() == format.id()) {
            if existing.source_label == source_label {
                return Ok(());
            }
            return Err(RegistryError::DuplicateFormat {
                id: format.id().to_string(),
                existing_source: existing.source_label.clone(),
                attempted_source: source_label.to_string(),
            });
        }
        self.formats.push(RegisteredFormat {
            format,
            source_label: source_label.to_string(),
        });
        Ok(())
    }

    pub fn has_format(&self, id: &str) -> bool {
        self.formats.iter().any(|f| f.format.id() == id)
    }

    /// Installed format ids in registration order.
    pub fn registered_formats(&self) -> Vec<&str> {
        self.formats.iter().map(|f| f.format.id()).collect()
    }

    fn find(&self, id: &str) -> Option<&dyn FlowFormat> {
        self.formats
            .iter()
            .find(|f| f.format.id() == id)
            .map(|f| f.format.as_ref())
    }

    /// Run every detector and keep the best score. Ties go to the earlier
    /// registration; anything below `MIN_CONFIDENCE` is "unknown".
    pub fn detect_format(&self, source: &str) -> Detection {
        let mut best = Detection::unknown();
        let mut best_score = 0.0_f64;
        for registered in &self.formats {
            let score = registered.format.detect(source);
            // Strict comparison keeps the first registered format on ties.
            if score > best_score {
                best_score = score;
                best = Detection {
                    format: registered.format.id().to_string(),
                    confidence: score,
                };
            }
        }
        if best_score < MIN_CONFIDENCE {
            return Detection::unknown();
        }
        best
    }

    /// Detect the format of `source` and parse with it.
    pub fn parse(&self, source: &str) -> Result<ParsedDocument, RegistryError> {
        let detection = self.detect_format(source);
        if detection.is_unknown() {
            return Err(RegistryError::UnknownFormat);
        }
        let format = self
            .find(&detection.format)
            .expect("detected format is registered");
        match format.parse(source) {
            Ok(parsed) => Ok(ParsedDocument {
                flow: parsed.flow,
                format: detection.format,
                warnings: parsed.warnings,
            }),
            Err(e) => Err(RegistryError::Parse {
                format: detection.format,
                source: e,
            }),
        }
    }

    /// Detect the format of `source` and run its structural validation.
    pub fn validate(&self, source: &str) -> ValidationReport {
        let detection = self.detect_format(source);
        if detection.is_unknown() {
            return ValidationReport::invalid(vec![RegistryError::UnknownFormat.to_string()]);
        }
        let format = self
            .find(&detection.format)
            .expect("detected format is registered");
        format.validate(source)
    }

    /// Serialize a flow using the named format.
    pub fn format_as(
        &self,
        flow: &FlowDefinition,
        format_id: &str,
    ) -> Option<Result<String, crate::error::FormatError>> {
        self.find(format_id).map(|f| f.format(flow))
    }
}
