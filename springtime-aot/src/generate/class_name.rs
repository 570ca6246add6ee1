//! Names of generated classes and their deterministic allocation.

use fxhash::FxHashMap;
use parking_lot::Mutex;
use proc_macro2::{Ident, Span, TokenStream};
use quote::{quote, ToTokens, TokenStreamExt};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use syn::ext::IdentExt;
use syn::Path;

const SEPARATOR: &str = "__";

const AOT_FEATURE: &str = "Aot";

/// Name of a type referenced from or emitted as generated code: a module path and a simple name.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ClassName {
    module_path: Vec<String>,
    simple_name: String,
}

impl ClassName {
    /// Parses a type path, e.g. `app::service::OrderService`. Generic arguments are dropped and raw
    /// identifiers are stored without the `r#` prefix. Returns `None` if the path is not a valid
    /// Rust path.
    pub fn parse(path: &str) -> Option<Self> {
        let path: Path = syn::parse_str(path).ok()?;
        let mut segments: Vec<_> = path
            .segments
            .iter()
            .map(|segment| segment.ident.unraw().to_string())
            .collect();

        let simple_name = segments.pop()?;
        Some(Self {
            module_path: segments,
            simple_name,
        })
    }

    #[inline]
    pub fn module_path(&self) -> &[String] {
        &self.module_path
    }

    #[inline]
    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    /// Returns a sibling type in the same module.
    pub fn peer(&self, simple_name: String) -> Self {
        Self {
            module_path: self.module_path.clone(),
            simple_name,
        }
    }

    /// Full path with `::` separators.
    pub fn canonical_name(&self) -> String {
        self.to_string()
    }

    /// Relative file path with `/` separators and given extension.
    pub fn file_path(&self, extension: &str) -> String {
        let mut path = self.module_path.join("/");
        if !path.is_empty() {
            path.push('/');
        }

        path.push_str(&self.simple_name);
        path.push('.');
        path.push_str(extension);
        path
    }
}

impl Display for ClassName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for segment in &self.module_path {
            write!(f, "{}::", segment)?;
        }

        f.write_str(&self.simple_name)
    }
}

impl ToTokens for ClassName {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        for segment in &self.module_path {
            let segment = to_ident(segment);
            tokens.append_all(quote!(#segment::));
        }

        tokens.append(to_ident(&self.simple_name));
    }
}

// keywords which can't be raw identifiers stay as they are
const PATH_KEYWORDS: [&str; 4] = ["crate", "self", "super", "Self"];

/// Creates an identifier for given name, escaping keywords as raw identifiers.
fn to_ident(name: &str) -> Ident {
    if PATH_KEYWORDS.contains(&name) || syn::parse_str::<Ident>(name).is_ok() {
        Ident::new(name, Span::call_site())
    } else {
        Ident::new_raw(name, Span::call_site())
    }
}

/// Generates unique class names for generated code. A name is built from a target (either given or
/// the default one), a feature name prefix and a feature name. Names clashing with previously
/// generated ones get a sequence number, so for the same sequence of requests the same names are
/// always produced.
#[derive(Clone, Debug)]
pub struct ClassNameGenerator {
    default_target: ClassName,
    feature_name_prefix: String,
    sequence_generator: Arc<Mutex<FxHashMap<String, usize>>>,
}

impl ClassNameGenerator {
    /// Creates a new generator using given default target, which is used when no explicit target
    /// is specified.
    pub fn new(default_target: ClassName) -> Self {
        Self::with_prefix(default_target, "")
    }

    pub fn with_prefix(default_target: ClassName, feature_name_prefix: &str) -> Self {
        Self {
            default_target,
            feature_name_prefix: feature_name_prefix.to_string(),
            sequence_generator: Default::default(),
        }
    }

    #[inline]
    pub fn feature_name_prefix(&self) -> &str {
        &self.feature_name_prefix
    }

    #[inline]
    pub fn default_target(&self) -> &ClassName {
        &self.default_target
    }

    /// Generates a unique class name for given feature name and optional target. The resulting
    /// type lives in the module of the target.
    pub fn generate_class_name(&self, feature_name: &str, target: Option<&ClassName>) -> ClassName {
        let target = target.unwrap_or(&self.default_target);
        let root_name = format!(
            "{}{}{}",
            target.simple_name(),
            SEPARATOR,
            capitalize(&format!(
                "{}{}",
                clean_prefix(&self.feature_name_prefix),
                clean(feature_name)
            ))
        );

        let sequence = {
            let mut sequence_generator = self.sequence_generator.lock();
            let next = sequence_generator
                .entry(target.peer(root_name.clone()).canonical_name())
                .or_insert(0);
            let sequence = *next;
            *next += 1;
            sequence
        };

        if sequence > 0 {
            target.peer(format!("{}{}", root_name, sequence))
        } else {
            target.peer(root_name)
        }
    }

    /// Returns a generator with a different feature name prefix, sharing the sequence numbers with
    /// this one.
    pub fn with_feature_name_prefix(&self, feature_name_prefix: &str) -> Self {
        Self {
            default_target: self.default_target.clone(),
            feature_name_prefix: feature_name_prefix.to_string(),
            sequence_generator: self.sequence_generator.clone(),
        }
    }
}

fn clean_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        String::new()
    } else {
        clean(prefix)
    }
}

// keeps letters only, capitalizing the ones following a dropped character
fn clean(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut last_not_letter = true;

    for ch in name.chars() {
        if !ch.is_alphabetic() {
            last_not_letter = true;
            continue;
        }

        if last_not_letter {
            result.extend(ch.to_uppercase());
        } else {
            result.push(ch);
        }

        last_not_letter = false;
    }

    if result.is_empty() {
        AOT_FEATURE.to_string()
    } else {
        result
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
