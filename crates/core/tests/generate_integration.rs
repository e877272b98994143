//! End-to-end generation over a real description into a temp directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use walkdir::WalkDir;

use apigen_core::engine::{generate, NoExtensionManager};
use apigen_core::generators::finder::ModelTypeFinder;
use apigen_core::{ApiModel, Configuration};

const DESCRIPTION: &str = r#"{
  "title": "Petstore",
  "version": "1.0.0",
  "types": [
    {
      "name": "Pet",
      "fields": [
        { "name": "id", "type": "string", "required": true },
        { "name": "name", "type": "string", "required": true },
        { "name": "kind", "type": "PetKind" },
        {
          "name": "home",
          "inline": {
            "name": "Address",
            "fields": [
              { "name": "street", "type": "string", "required": true },
              { "name": "city", "type": "string" }
            ]
          }
        }
      ]
    },
    { "name": "PetKind", "kind": "enum", "values": ["cat", "dog"] },
    { "name": "PetId", "kind": "alias", "aliased": "string" },
    {
      "name": "Tag",
      "kind": "schema",
      "schema": { "type": "object", "properties": { "label": { "type": "string" } } }
    }
  ],
  "resources": [
    {
      "name": "Pets",
      "path": "/pets",
      "methods": [
        {
          "name": "list",
          "http": "get",
          "responses": [ { "status": 200, "type": "Pet[]" } ]
        },
        {
          "name": "create",
          "http": "post",
          "body": "Pet",
          "responses": [
            { "status": 201, "type": "Pet" },
            { "status": 204 }
          ]
        }
      ]
    }
  ]
}"#;

fn generated_paths(root: &Path) -> BTreeSet<String> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

fn run(config: &Configuration) -> (TempDir, BTreeSet<String>) {
    let api = ApiModel::from_json(DESCRIPTION).unwrap();
    let out = TempDir::new().unwrap();
    let finder = ModelTypeFinder::new(&api);
    generate(&api, &finder, Arc::new(NoExtensionManager), config, out.path()).unwrap();
    let paths = generated_paths(out.path());
    (out, paths)
}

#[test]
fn test_generates_expected_file_tree() {
    let (_out, paths) = run(&Configuration::default());

    let expected: BTreeSet<String> = [
        // Object type: interface and implementation phases.
        "model/Pet.ts",
        "model/PetImpl.ts",
        // Interface-only tree units.
        "model/PetKind.ts",
        "model/PetId.ts",
        // Flat schema unit, at the destination root.
        "Tag.ts",
        // Resource and its support dependencies.
        "resources/PetsClient.ts",
        "support/ApiError.ts",
        "support/ResponseEnvelope.ts",
        "support/RuntimeTypes.ts",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    assert_eq!(paths, expected);
}

#[test]
fn test_nested_unit_embedded_in_both_phases() {
    let (out, paths) = run(&Configuration::default());

    // The inline Address declaration never becomes a standalone artifact.
    assert!(!paths.contains("model/Address.ts"));
    assert!(!paths.contains("model/AddressImpl.ts"));

    let interface = fs::read_to_string(out.path().join("model/Pet.ts")).unwrap();
    assert!(interface.contains("export interface Pet {"));
    assert!(interface.contains("home?: Pet.Address;"));
    assert!(interface.contains("export namespace Pet {"));
    assert!(interface.contains("export interface Address {"));

    let implementation = fs::read_to_string(out.path().join("model/PetImpl.ts")).unwrap();
    assert!(implementation.contains("export class PetImpl implements Pet {"));
    assert!(implementation.contains("export namespace PetImpl {"));
    // The nested unit re-renders for the implementation phase with a
    // different shape.
    assert!(implementation.contains("export class AddressImpl implements Pet.Address {"));
}

#[test]
fn test_resource_client_contents() {
    let (out, _paths) = run(&Configuration::default());

    let client = fs::read_to_string(out.path().join("resources/PetsClient.ts")).unwrap();
    assert!(client.starts_with("import { ApiError } from \"../support/ApiError\";"));
    assert!(client.contains("export class PetsClient {"));
    assert!(client.contains("async list(): Promise<Pet[]> {"));
    assert!(client.contains("async create(payload: Pet): Promise<Pet> {"));
    assert!(client.contains("throw new ApiError(res.status, await res.text());"));
    // Response wrappers are nested members of the client.
    assert!(client.contains("export namespace PetsClient {"));
    assert!(client.contains("export class ListResponse {"));
    assert!(client.contains("static respond200(body: Pet[]): ListResponse {"));
    assert!(client.contains("static respond204(): CreateResponse {"));
}

#[test]
fn test_enum_and_alias_render() {
    let (out, _paths) = run(&Configuration::default());

    let kind = fs::read_to_string(out.path().join("model/PetKind.ts")).unwrap();
    assert!(kind.contains("export const PetKind = {"));
    assert!(kind.contains("Cat: \"cat\","));

    let id = fs::read_to_string(out.path().join("model/PetId.ts")).unwrap();
    assert_eq!(id, "export type PetId = string;\n");
}

#[test]
fn test_schema_type_emitted_at_root() {
    let (out, _paths) = run(&Configuration::default());

    let tag = fs::read_to_string(out.path().join("Tag.ts")).unwrap();
    assert!(tag.contains("export const TagSchema = {"));
    assert!(tag.contains("export type Tag = Record<string, unknown>;"));
}

#[test]
fn test_extension_tags_shape_the_output() {
    let config = Configuration {
        type_extension_tags: vec!["jsdoc".to_string(), "readonly".to_string(), "validation".to_string()],
        ..Configuration::default()
    };
    let (out, _paths) = run(&config);

    let interface = fs::read_to_string(out.path().join("model/Pet.ts")).unwrap();
    assert!(interface.contains("Generated from the `Pet` declaration."));
    assert!(interface.contains("readonly id: string;"));

    let implementation = fs::read_to_string(out.path().join("model/PetImpl.ts")).unwrap();
    assert!(implementation.contains("validate(): string[] {"));
    assert!(implementation.contains("problems.push(\"id is required\")"));

    let client = fs::read_to_string(out.path().join("resources/PetsClient.ts")).unwrap();
    assert!(client.contains("static validatePayload(payload: unknown): string[] {"));
}

#[test]
fn test_custom_packages_relocate_artifacts() {
    let config = Configuration {
        model_package: "api.model".to_string(),
        resource_package: "api.client".to_string(),
        support_package: "api.support".to_string(),
        ..Configuration::default()
    };
    let (out, paths) = run(&config);

    assert!(paths.contains("api/model/Pet.ts"));
    assert!(paths.contains("api/client/PetsClient.ts"));
    assert!(paths.contains("api/support/ApiError.ts"));

    let client = fs::read_to_string(out.path().join("api/client/PetsClient.ts")).unwrap();
    assert!(client.starts_with("import { ApiError } from \"../../api/support/ApiError\";"));
}
