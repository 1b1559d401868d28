//! proto3 source rendering for compiled descriptors
//!
//! This crate turns an encoded `FileDescriptorSet` back into proto3 source
//! for its last file. Two strategies implement [`ProtoRenderer`]:
//!
//! - [`DirectRenderer`]: decodes the set as given and walks the file
//! - [`SynthesizingRenderer`]: prepends synthesized well-known dependencies,
//!   validates the set in a descriptor pool and hands the file to a
//!   [`DescriptorPrinter`]
//!
//! ## Example
//! ```rust,ignore
//! use proto_renderer_common::RenderOptions;
//! use proto_renderer_generator::renderer_for;
//!
//! let renderer = renderer_for(&RenderOptions::default());
//! let source = renderer.render(include_bytes!("greeter.pb"))?;
//! ```

mod line_writer;
mod printer;
mod type_mapper;

pub use line_writer::LineWriter;
pub use printer::{StructuralPrinter, GENERATED_HEADER};
pub use type_mapper::{Scope, TypeMapper};

use prost_reflect::FileDescriptor;
use proto_renderer_common::{RenderOptions, Result, Strategy};
use proto_renderer_parser::ProtobufParser;
use tracing::debug;

/// Renders the last file of an encoded FileDescriptorSet as proto3 source
pub trait ProtoRenderer {
    fn render(&self, encoded_set: &[u8]) -> Result<Vec<u8>>;
}

/// Prints a resolved file descriptor
///
/// Implementations receive the last file of a validated pool; every other
/// file of the pool is its dependency closure.
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorPrinter {
    fn print(&self, file: &FileDescriptor) -> Result<String>;
}

/// Walks the file as given; the set must be self-contained
#[derive(Debug, Clone)]
pub struct DirectRenderer {
    printer: StructuralPrinter,
}

impl DirectRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            printer: StructuralPrinter::new(options),
        }
    }
}

impl ProtoRenderer for DirectRenderer {
    fn render(&self, encoded_set: &[u8]) -> Result<Vec<u8>> {
        let parser = ProtobufParser::from_file_descriptor_set(encoded_set)?;
        let file = parser.target_file()?;
        debug!(file = file.name(), "direct render");

        Ok(self.printer.render_file(&file)?.into_bytes())
    }
}

/// Supplies missing well-known dependencies before printing
#[derive(Debug, Clone)]
pub struct SynthesizingRenderer<P = StructuralPrinter> {
    printer: P,
}

impl SynthesizingRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self::with_printer(StructuralPrinter::new(options))
    }
}

impl<P: DescriptorPrinter> SynthesizingRenderer<P> {
    pub fn with_printer(printer: P) -> Self {
        Self { printer }
    }
}

impl<P: DescriptorPrinter> ProtoRenderer for SynthesizingRenderer<P> {
    fn render(&self, encoded_set: &[u8]) -> Result<Vec<u8>> {
        let parser = ProtobufParser::with_synthesized_dependencies(encoded_set)?;
        let file = parser.target_file()?;
        debug!(file = file.name(), "synthesizing render");

        let mut source = self.printer.print(&file)?;
        if !source.ends_with('\n') {
            source.push('\n');
        }
        Ok(source.into_bytes())
    }
}

/// Renderer for the configured strategy
pub fn renderer_for(options: &RenderOptions) -> Box<dyn ProtoRenderer> {
    match options.strategy {
        Strategy::Direct => Box::new(DirectRenderer::new(options)),
        Strategy::Synthesizing => Box::new(SynthesizingRenderer::new(options)),
    }
}
