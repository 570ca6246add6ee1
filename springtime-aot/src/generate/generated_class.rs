//! A single type emitted as generated source, together with its methods.

use crate::error::GeneratedClassError;
use crate::generate::class_name::ClassName;
use crate::generate::generated_method::GeneratedMethods;
use crate::generate::spec::TypeSpec;
use std::fmt::Write;

/// A generated type: a unit struct with an inherent implementation containing all generated
/// methods.
#[derive(Debug)]
pub struct GeneratedClass {
    name: ClassName,
    type_spec: TypeSpec,
    methods: GeneratedMethods,
}

impl GeneratedClass {
    pub(crate) fn new(name: ClassName, type_spec: TypeSpec) -> Self {
        Self {
            methods: GeneratedMethods::new(name.clone()),
            name,
            type_spec,
        }
    }

    #[inline]
    pub fn name(&self) -> &ClassName {
        &self.name
    }

    #[inline]
    pub fn type_spec(&self) -> &TypeSpec {
        &self.type_spec
    }

    #[inline]
    pub fn methods(&self) -> &GeneratedMethods {
        &self.methods
    }

    /// Checks if given type spec describes the same type as the one used to create this class.
    pub fn assert_same_type(&self, type_spec: &TypeSpec) -> Result<(), GeneratedClassError> {
        if &self.type_spec == type_spec {
            Ok(())
        } else {
            Err(GeneratedClassError::IncompatibleRedefinition {
                class_name: self.name.canonical_name(),
            })
        }
    }

    /// Renders the source of this class.
    pub fn generate_source(&self) -> SourceFile {
        let mut content = String::new();
        let simple_name = self.name.simple_name();

        // writing to a String is infallible
        let _ = writeln!(content, "// Generated ahead-of-time. Do not edit.");
        let _ = writeln!(content);

        if !self.type_spec.imports().is_empty() {
            for import in self.type_spec.imports() {
                let _ = writeln!(content, "use {};", import);
            }

            let _ = writeln!(content);
        }

        write_doc(&mut content, self.type_spec.doc(), "");
        let _ = writeln!(
            content,
            "{}struct {};",
            self.type_spec.visibility().keyword(),
            simple_name
        );
        let _ = writeln!(content);
        let _ = writeln!(content, "impl {} {{", simple_name);

        for (index, method) in self.methods.methods().iter().enumerate() {
            if index > 0 {
                let _ = writeln!(content);
            }

            let spec = method.spec();
            write_doc(&mut content, spec.doc(), "    ");
            let _ = writeln!(content, "    {} {{", spec.signature());

            for statement in spec.statements() {
                let _ = writeln!(content, "        {};", statement);
            }

            if let Some(tail) = spec.tail() {
                let _ = writeln!(content, "        {}", tail);
            }

            let _ = writeln!(content, "    }}");
        }

        let _ = writeln!(content, "}}");

        SourceFile {
            class_name: self.name.clone(),
            content,
        }
    }
}

fn write_doc(content: &mut String, doc: Option<&str>, indent: &str) {
    if let Some(doc) = doc {
        for line in doc.lines() {
            let _ = writeln!(content, "{}/// {}", indent, line);
        }
    }
}

/// Rendered source of a generated class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceFile {
    class_name: ClassName,
    content: String,
}

impl SourceFile {
    #[inline]
    pub fn class_name(&self) -> &ClassName {
        &self.class_name
    }

    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Relative path of the file, derived from the class name.
    pub fn path(&self) -> String {
        self.class_name.file_path("rs")
    }
}
