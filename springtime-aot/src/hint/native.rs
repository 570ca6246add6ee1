//! Rendering of [RuntimeHints] as native image configuration files.

use crate::hint::{ExecutableHint, ExecutableMode, MemberCategory, RuntimeHints, TypeHint};
use serde::Serialize;
use std::collections::BTreeMap;

/// Name of the reflection configuration file.
pub const REFLECT_CONFIG_FILE: &str = "reflect-config.json";

/// Name of the resource configuration file.
pub const RESOURCE_CONFIG_FILE: &str = "resource-config.json";

#[derive(Serialize)]
struct Condition<'a> {
    #[serde(rename = "typeReachable")]
    type_reachable: &'a str,
}

#[derive(Serialize)]
struct Executable<'a> {
    name: &'a str,
    #[serde(rename = "parameterTypes")]
    parameter_types: Vec<&'a str>,
}

#[derive(Serialize)]
struct Field<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReflectEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<Condition<'a>>,
    #[serde(flatten)]
    flags: BTreeMap<&'static str, bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<Field<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    methods: Vec<Executable<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    queried_methods: Vec<Executable<'a>>,
}

#[derive(Serialize)]
struct ResourcePattern<'a> {
    pattern: &'a str,
}

#[derive(Serialize)]
struct ResourceIncludes<'a> {
    includes: Vec<ResourcePattern<'a>>,
}

#[derive(Serialize)]
struct ResourceConfig<'a> {
    resources: ResourceIncludes<'a>,
}

fn flag_name(category: MemberCategory) -> &'static str {
    match category {
        MemberCategory::PublicFields => "allPublicFields",
        MemberCategory::DeclaredFields => "allDeclaredFields",
        MemberCategory::IntrospectPublicConstructors => "queryAllPublicConstructors",
        MemberCategory::IntrospectDeclaredConstructors => "queryAllDeclaredConstructors",
        MemberCategory::InvokePublicConstructors => "allPublicConstructors",
        MemberCategory::InvokeDeclaredConstructors => "allDeclaredConstructors",
        MemberCategory::IntrospectPublicMethods => "queryAllPublicMethods",
        MemberCategory::IntrospectDeclaredMethods => "queryAllDeclaredMethods",
        MemberCategory::InvokePublicMethods => "allPublicMethods",
        MemberCategory::InvokeDeclaredMethods => "allDeclaredMethods",
    }
}

fn executable(hint: &ExecutableHint) -> Executable<'_> {
    Executable {
        name: &hint.name,
        parameter_types: hint
            .parameter_types
            .iter()
            .map(|parameter| parameter.name())
            .collect(),
    }
}

fn reflect_entry(hint: &TypeHint) -> ReflectEntry<'_> {
    let (invoked, queried): (Vec<_>, Vec<_>) = hint
        .constructors()
        .iter()
        .chain(hint.methods())
        .partition(|executable| executable.mode == ExecutableMode::Invoke);

    ReflectEntry {
        name: hint.type_reference().name(),
        condition: hint.reachable_type().map(|reachable_type| Condition {
            type_reachable: reachable_type.name(),
        }),
        flags: hint
            .member_categories()
            .iter()
            .map(|category| (flag_name(*category), true))
            .collect(),
        fields: hint
            .fields()
            .iter()
            .map(|name| Field { name })
            .collect(),
        methods: invoked.into_iter().map(executable).collect(),
        queried_methods: queried.into_iter().map(executable).collect(),
    }
}

/// Renders hints into native image configuration files. Returns pairs of file names and their
/// content; sections without any hints produce no file.
pub fn render(hints: &RuntimeHints) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
    let mut files = Vec::new();

    let type_hints = hints.reflection().type_hints();
    if !type_hints.is_empty() {
        let entries: Vec<_> = type_hints.iter().map(reflect_entry).collect();
        files.push((REFLECT_CONFIG_FILE, serde_json::to_string_pretty(&entries)?));
    }

    let patterns = hints.resources().patterns();
    if !patterns.is_empty() {
        let config = ResourceConfig {
            resources: ResourceIncludes {
                includes: patterns
                    .iter()
                    .map(|pattern| ResourcePattern { pattern })
                    .collect(),
            },
        };

        files.push((RESOURCE_CONFIG_FILE, serde_json::to_string_pretty(&config)?));
    }

    Ok(files)
}
