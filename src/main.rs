use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::LevelFilter;

#[macro_use]
extern crate lazy_static;

use efiboot::{DevicePathNode, LoadOption};

// efivarfs prefixes every variable with its 32-bit attributes.
const EFIVARFS_ATTR_LEN: usize = 4;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Re-encode the load option into <file>
    #[arg(short, long, value_name = "file")]
    output: Option<PathBuf>,

    /// Show each device path node with a hexdump of its encoding
    #[arg(short, long)]
    verbose: bool,

    /// Produce debugging output
    #[arg(short, long)]
    debug: bool,

    /// Print the decoded load option as JSON
    #[arg(short, long)]
    json: bool,

    /// The input was copied from efivarfs and starts with the variable
    /// attributes
    #[arg(short, long)]
    efivarfs: bool,

    /// A file holding the value of a load option variable
    #[arg(value_name = "input")]
    file: PathBuf,
}

lazy_static! {
    static ref HEXDUMPER: rhexdump::Rhexdump = {
        let mut rhx = rhexdump::Rhexdump::default();
        rhx.display_duplicate_lines(false);
        rhx
    };
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    let pd = args.file.display();
    let raw = fs::read(&args.file)
        .with_context(|| format!("Could not open {}", pd))?;

    let value = if args.efivarfs {
        if raw.len() < EFIVARFS_ATTR_LEN {
            bail!("{} is too short to be an efivarfs variable", pd);
        }
        &raw[EFIVARFS_ATTR_LEN..]
    } else {
        &raw[..]
    };

    let opt = LoadOption::parse(value)
        .with_context(|| format!("Could not parse {}", pd))?;

    if args.debug {
        println!("{:#x?}", opt);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&opt)?);
    } else {
        display_option(&opt, args.verbose)?;
    }

    if let Some(opath) = args.output {
        let mut out = File::create(&opath).with_context(||
            format!("Could not open output file {}", opath.display()))?;
        let n = opt.write_to(&mut out).with_context(||
            format!("Could not write to output file {}", opath.display()))?;
        log::debug!("wrote {} bytes to {}", n, opath.display());
    }

    Ok(())
}

fn display_option(opt: &LoadOption, verbose: bool) -> Result<()> {
    let mut tag = String::new();
    tag.push(if opt.is_active() { 'A' } else { ' ' });
    tag.push(if opt.is_hidden() { 'H' } else { ' ' });

    println!("{} {} - [{}]{}", tag, opt.description(), opt.boot_target(),
        if opt.is_uri() { " [HTTP]" } else { "" });
    println!("    {}", opt.file_path_list);

    if verbose {
        println!("    Attributes: {:#x}", opt.attributes);
        for (i, p) in opt.file_path_list.iter().enumerate() {
            let h = p.header();
            println!(
                "    File path {:2x} Type: {:#x}/{:#x} Length: {:#x}",
                i, h.device_type, h.sub_type, h.length);
            if let DevicePathNode::Unrecognized(_) = p {
                println!("    (no decoder for this type)");
            }
            print!("{}\n", HEXDUMPER.hexdump(&p.encode()?));
        }
        if !opt.optional_data.is_empty() {
            println!("    Optional Data:");
            print!("{}\n", HEXDUMPER.hexdump(&opt.optional_data));
        }
        println!();
        println!("A - Active");
        println!(" H - Hidden");
    }
    Ok(())
}
