//! Shader Code Generator
//!
//! WGSL is produced from embedded minijinja templates. The syntax is tuned
//! so it never collides with WGSL: blocks use `{$ ... $}`, expressions use
//! `{{ ... }}`, and `$$` starts a line statement.
//!
//! Inside a template, `loc.next()` hands out consecutive `@location` indices,
//! which keeps varyings contiguous whatever subset the flags enable.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use minijinja::syntax::SyntaxConfig;
use minijinja::value::{Object, Value};
use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior};
use rust_embed::RustEmbed;
use serde::Serialize;

use oktaeder_core::{OktaederError, Result};

use super::flags::ShaderFlags;
use super::vertex::generate_vertex_layout;

const FORWARD_TEMPLATE: &str = "forward";

static SHADER_ENV: OnceLock<std::result::Result<Environment<'static>, String>> = OnceLock::new();

#[derive(RustEmbed)]
#[folder = "src/pipeline/shaders"]
struct ShaderAssets;

fn get_env() -> Result<&'static Environment<'static>> {
    SHADER_ENV
        .get_or_init(build_env)
        .as_ref()
        .map_err(|e| OktaederError::ShaderGeneration(e.clone()))
}

fn build_env() -> std::result::Result<Environment<'static>, String> {
    let mut env = Environment::new();

    let syntax = SyntaxConfig::builder()
        .block_delimiters("{$", "$}")
        .variable_delimiters("{{", "}}")
        .line_statement_prefix("$$")
        .build()
        .map_err(|e| format!("invalid template syntax: {e}"))?;

    env.set_syntax(syntax);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(UndefinedBehavior::SemiStrict);
    env.set_loader(shader_loader);
    env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());

    Ok(env)
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    let Some(file) = ShaderAssets::get(&filename) else {
        return Ok(None);
    };
    match std::str::from_utf8(file.data.as_ref()) {
        Ok(source) => Ok(Some(source.to_string())),
        Err(e) => Err(Error::new(
            ErrorKind::InvalidOperation,
            format!("{filename} is not valid UTF-8: {e}"),
        )),
    }
}

/// Hands out increasing `@location` indices to a template.
#[derive(Debug, Default)]
pub struct LocationAllocator {
    counter: AtomicU32,
}

impl LocationAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u32 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl Object for LocationAllocator {
    fn call_method(
        self: &Arc<Self>,
        _state: &minijinja::State,
        name: &str,
        _args: &[Value],
    ) -> std::result::Result<Value, Error> {
        if name == "next" {
            Ok(Value::from(self.next()))
        } else {
            Err(Error::new(
                ErrorKind::UnknownMethod,
                format!("method {name} not found"),
            ))
        }
    }
}

#[derive(Serialize)]
struct ShaderContext<'a> {
    tex_coord: bool,
    light_tex_coord: bool,
    normal: bool,
    tangent: bool,
    vertex_input_code: &'a str,
    loc: Value,
}

/// Generates the forward shading WGSL for one flag set.
///
/// Vertex attributes, varyings and texture sampling that the flags do not
/// enable are left out entirely. The tangent frame needs both normals and
/// tangents, so a mesh with tangents but no normals ignores its tangents.
pub fn generate_shader(flags: ShaderFlags) -> Result<String> {
    let env = get_env()?;
    let layout = generate_vertex_layout(flags);

    let ctx = ShaderContext {
        tex_coord: flags.contains(ShaderFlags::TEX_COORD),
        light_tex_coord: flags.contains(ShaderFlags::LIGHT_TEX_COORD),
        normal: flags.contains(ShaderFlags::NORMAL),
        tangent: flags.contains(ShaderFlags::TANGENT),
        vertex_input_code: &layout.vertex_input_code,
        loc: Value::from_object(LocationAllocator::new()),
    };

    let template = env
        .get_template(FORWARD_TEMPLATE)
        .map_err(|e| OktaederError::ShaderGeneration(e.to_string()))?;
    let source = template
        .render(&ctx)
        .map_err(|e| OktaederError::ShaderGeneration(e.to_string()))?;

    Ok(format!(
        "// === Generated forward shader, flags {:#06b} ===\n{source}",
        flags.key()
    ))
}
