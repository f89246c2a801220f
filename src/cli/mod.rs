//! Command-line entry points.
//!
//! Each subcommand builds a fresh parser plus the drivers it needs, runs
//! the parse, and renders the output files. Parse failures surface as a
//! labeled diagnostic pointing at the spot where the grammar gave up.

pub mod args;
pub mod output;

use std::fs;
use std::path::Path;

use clap::Parser;
use miette::NamedSource;

use crate::cli::args::{Command, ForgeArgs};
use crate::codegen::{enum_functions, index};
use crate::drivers::{ClassDriver, EnumDriver};
use crate::errors::ForgeError;
use crate::model::{Catalog, ClassData, EnumData};
use crate::syntax::{ParseOutcome, SourceParser};

/// Parse the process arguments and run the selected subcommand.
pub fn run() -> Result<(), ForgeError> {
    let args = ForgeArgs::parse();
    match args.command {
        Command::GenEnums {
            input, cpp, header, ..
        } => gen_enums(&input, &cpp, &header),
        Command::Index {
            headers, output, ..
        } => index_headers(&headers, &output),
    }
}

fn gen_enums(input: &Path, cpp: &Path, header: &Path) -> Result<(), ForgeError> {
    let input_name = input.display().to_string();
    let source = read(input)?;

    let parser = SourceParser::new();
    let mut enums = EnumDriver::new();
    enums.attach(&parser);
    enums.set_current_file(&input_name);

    let outcome = parser.parse(&source);
    if !outcome.success {
        return Err(parse_error(input, &source, &outcome));
    }

    let catalog = enums.enums();
    if catalog.is_empty() {
        output::warning(&format!("no enumerations found in {input_name}"));
    }
    write(header, &enum_functions::render_header(&catalog, &input_name))?;
    write(
        cpp,
        &enum_functions::render_source(&catalog, &header.display().to_string()),
    )?;
    output::done(&format!(
        "Generated conversion functions for {} enums",
        catalog.len()
    ));
    Ok(())
}

fn index_headers(headers: &[std::path::PathBuf], output_path: &Path) -> Result<(), ForgeError> {
    let mut catalog = Catalog::default();
    output::status("Parsing headers...");
    for header in headers {
        let header_name = header.display().to_string();
        output::status(&format!("Parsing {header_name}..."));
        let source = read(header)?;

        // Fresh parser and drivers per file; the catalogs merge afterward.
        let parser = SourceParser::new();
        let mut enums = EnumDriver::new();
        let mut classes = ClassDriver::new();
        enums.attach(&parser);
        classes.attach(&parser);
        enums.set_current_file(&header_name);
        classes.set_current_file(&header_name);

        let _enum_log = enums
            .enum_available()
            .connect(|(key, _): &(String, EnumData)| {
                output::status(&format!("Adding enum {key}"));
            });
        let _class_log = classes
            .class_available()
            .connect(|(key, _): &(String, ClassData)| {
                output::status(&format!("Adding class {key}"));
            });

        let outcome = parser.parse(&source);
        if !outcome.success {
            return Err(parse_error(header, &source, &outcome));
        }
        catalog.enums.extend(enums.take_enums());
        catalog.classes.extend(classes.take_classes());
    }

    output::status("Writing JSON...");
    write(output_path, &index::render_json(&catalog)?)?;
    output::done("Processing complete");
    Ok(())
}

fn parse_error(path: &Path, source: &str, outcome: &ParseOutcome<'_>) -> ForgeError {
    let consumed = source.len() - outcome.remainder.len();
    ForgeError::ParseIncomplete {
        src: NamedSource::new(path.display().to_string(), source.to_string()),
        location: (consumed, 1).into(),
        remaining: outcome.remainder.len(),
    }
}

fn read(path: &Path) -> Result<String, ForgeError> {
    fs::read_to_string(path).map_err(|source| ForgeError::ReadFailed {
        path: path.display().to_string(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), ForgeError> {
    fs::write(path, contents).map_err(|source| ForgeError::WriteFailed {
        path: path.display().to_string(),
        source,
    })
}
