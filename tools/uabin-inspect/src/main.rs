// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! uabin-inspect - OPC UA binary message inspector
//!
//! Decodes captured request/response messages into a field tree, lists the
//! service table and checks dispatcher configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use uabin::config::{EncodingLimits, UaConfig};
use uabin::debug;
use uabin::service::{decode_request, decode_response, service_table, ServiceRequest, ServiceResponse};
use uabin::types::{DataType, DataTypeMember, Field, TypeTable, Value};

/// OPC UA binary message inspector
#[derive(Parser, Debug)]
#[command(name = "uabin-inspect")]
#[command(version)]
#[command(about = "Decode OPC UA binary service messages")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn", global = true)]
    log_level: log::LevelFilter,

    /// Take encoding limits from a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode one message, starting at its encoding id
    Decode {
        /// File holding the raw message
        file: Option<PathBuf>,

        /// Message as hex text (whitespace and ':' are ignored)
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,

        /// Decode as a response or ServiceFault instead of a request
        #[arg(short, long)]
        response: bool,

        /// Print a hex dump of the input first
        #[arg(long)]
        dump: bool,
    },
    /// List the supported services and their encoding ids
    Services,
    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// TOML configuration file
        file: PathBuf,
    },
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    if let Err(e) = run(&args) {
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    match &args.command {
        Command::Decode {
            file,
            hex,
            response,
            dump,
        } => {
            let limits = load_config(args.config.as_deref())?.encoding;
            let bytes = read_input(file.as_deref(), hex.as_deref())?;
            if *dump {
                print_dump(&bytes);
            }
            let types = TypeTable::new();
            if *response {
                let response = decode_response(&bytes, &types, limits).context("decoding response")?;
                print_response(&response);
            } else {
                let request = decode_request(&bytes, &types, limits).context("decoding request")?;
                print_request(&request);
            }
            Ok(())
        }
        Command::Services => {
            print_services();
            Ok(())
        }
        Command::CheckConfig { file } => {
            let config = load_config(Some(file))?;
            print_config(&config);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<UaConfig> {
    match path {
        Some(path) => UaConfig::from_file(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(UaConfig::default()),
    }
}

fn read_input(file: Option<&Path>, hex: Option<&str>) -> Result<Vec<u8>> {
    match (file, hex) {
        (_, Some(hex)) => parse_hex(hex),
        (Some(path), None) => fs::read(path).with_context(|| format!("reading {}", path.display())),
        (None, None) => bail!("give a message FILE or --hex"),
    }
}

fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("invalid hex text")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte {:?}", pair))
        })
        .collect()
}

fn print_dump(bytes: &[u8]) {
    println!("{} ({} bytes)", "Message".cyan().bold(), bytes.len());
    for (row, chunk) in bytes.chunks(16).enumerate() {
        println!("  {}", debug::format_row(row * 16, chunk).dimmed());
    }
    println!();
}

/// Body members follow the leading header member.
fn body_members(ty: &DataType) -> &[DataTypeMember] {
    ty.members.get(1..).unwrap_or_default()
}

fn print_request(request: &ServiceRequest) {
    let header = &request.header;
    println!("{} {}", "Request".green().bold(), request.encodeable_type.name.bold());
    println!("  {:<22} {}", "RequestHandle".yellow(), header.request_handle);
    println!("  {:<22} {}", "AuthenticationToken".yellow(), header.authentication_token);
    println!("  {:<22} {}", "Timestamp".yellow(), header.timestamp);
    println!("  {:<22} {}ms", "TimeoutHint".yellow(), header.timeout_hint);
    println!("  {:<22} {:#x}", "ReturnDiagnostics".yellow(), header.return_diagnostics);
    for (member, field) in body_members(&request.encodeable_type).iter().zip(&request.body.fields) {
        print_field(&member.name, field, member, 1);
    }
}

fn print_response(response: &ServiceResponse) {
    let header = &response.header;
    let title = if response.is_fault() {
        "Fault".red().bold()
    } else {
        "Response".green().bold()
    };
    println!("{} {}", title, response.encodeable_type.name.bold());
    println!("  {:<22} {}", "RequestHandle".yellow(), header.request_handle);
    let result = header.service_result.to_string();
    let result = if header.service_result.is_bad() {
        result.red()
    } else if header.service_result.is_uncertain() {
        result.yellow()
    } else {
        result.green()
    };
    println!("  {:<22} {}", "ServiceResult".yellow(), result);
    println!("  {:<22} {}", "Timestamp".yellow(), header.timestamp);
    if !header.service_diagnostics.is_empty() {
        println!("  {:<22} {:?}", "ServiceDiagnostics".yellow(), header.service_diagnostics);
    }
    if let Some(strings) = &header.string_table {
        println!("  {:<22} {:?}", "StringTable".yellow(), strings);
    }
    for (member, field) in body_members(&response.encodeable_type).iter().zip(&response.body.fields) {
        print_field(&member.name, field, member, 1);
    }
}

fn print_field(label: &str, field: &Field, member: &DataTypeMember, indent: usize) {
    let pad = "  ".repeat(indent);
    match field {
        Field::Absent => println!("{}{}: {}", pad, label.cyan(), "<absent>".dimmed()),
        Field::Array(None) => println!("{}{}: {}", pad, label.cyan(), "null".dimmed()),
        Field::Array(Some(values)) => {
            println!("{}{}: {}[{}]", pad, label.cyan(), member.member_type.name, values.len());
            for (i, value) in values.iter().enumerate() {
                print_value(&format!("[{}]", i), value, &member.member_type, indent + 1);
            }
        }
        Field::Scalar(value) => print_value(label, value, &member.member_type, indent),
    }
}

fn print_value(label: &str, value: &Value, ty: &DataType, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Structure(s) => {
            println!("{}{}: {}", pad, label.cyan(), ty.name);
            for (member, field) in ty.members.iter().zip(&s.fields) {
                print_field(&member.name, field, member, indent + 1);
            }
        }
        Value::Union(u) => {
            let selected = (u.switch as usize)
                .checked_sub(1)
                .and_then(|i| ty.members.get(i));
            match (selected, &u.value) {
                (Some(member), Some(field)) => {
                    println!("{}{}: {} ({})", pad, label.cyan(), ty.name, member.name);
                    print_field(&member.name, field, member, indent + 1);
                }
                _ => println!("{}{}: {} {}", pad, label.cyan(), ty.name, "<empty>".dimmed()),
            }
        }
        Value::DataValue(dv) => {
            let value = dv.value.as_ref().map_or_else(|| "-".to_string(), ToString::to_string);
            match dv.status {
                Some(status) => println!("{}{}: {} [{}]", pad, label.cyan(), value, status),
                None => println!("{}{}: {}", pad, label.cyan(), value),
            }
        }
        other => println!("{}{}: {}", pad, label.cyan(), other),
    }
}

fn print_services() {
    println!(
        "{:<32} {:>10} {:>10} {:>10}",
        "Service".bold(),
        "TypeId".bold(),
        "ReqEnc".bold(),
        "RespEnc".bold()
    );
    for service in service_table().entries() {
        println!(
            "{:<32} {:>10} {:>10} {:>10}",
            service.name(),
            service.request_type_id().to_string(),
            service.request_encoding_id().to_string(),
            service.response_encoding_id().to_string()
        );
    }
    println!("\n{} services", service_table().len());
}

fn print_config(config: &UaConfig) {
    let enc: &EncodingLimits = &config.encoding;
    println!("{}", "Configuration OK".green().bold());
    println!("[encoding]");
    println!("  max_array_length      = {}", enc.max_array_length);
    println!("  max_string_length     = {}", enc.max_string_length);
    println!("  max_bytestring_length = {}", enc.max_bytestring_length);
    println!("  max_recursion_depth   = {}", enc.max_recursion_depth);
    println!("  max_message_size      = {}", enc.max_message_size);
    println!("  overlayable_fast_path = {}", enc.overlayable_fast_path);
    println!("[dispatcher]");
    println!("  max_pending_requests  = {}", config.dispatcher.max_pending_requests);
    println!("  log_buffers           = {}", config.dispatcher.log_buffers);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("01 00 77:02\n").expect("hex"), vec![0x01, 0x00, 0x77, 0x02]);
        assert!(parse_hex("0").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["uabin-inspect", "--log-level", "debug", "decode", "--hex", "00"])
            .expect("args");
        assert_eq!(args.log_level, log::LevelFilter::Debug);
        assert!(matches!(args.command, Command::Decode { hex: Some(_), .. }));
        assert!(Args::try_parse_from(["uabin-inspect", "decode", "msg.bin", "--hex", "00"]).is_err());
    }
}
