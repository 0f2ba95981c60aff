use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap_num::maybe_hex;

use djtag_bitbang::cable::djtag::Djtag;
use djtag_bitbang::protocol;
use djtag_bitbang::register::devmem::DevMem;
use djtag_bitbang::register::Register;

// The -2 that OpenOCD drivers return for ERROR_JTAG_INIT_FAILED, as an exit status
const EXIT_INIT_FAILED: u8 = 254;

/// remote_bitbang JTAG adapter for the SC8810 DSP JTAG port.  Commands are read from stdin and
/// replies written to stdout.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Physical memory device to map the control register from
    #[arg(long, env = "DJTAG_MEM", default_value = "/dev/mem")]
    mem: PathBuf,

    /// Physical address of the DSP JTAG control register
    #[arg(long, env = "DJTAG_ADDRESS", value_parser = maybe_hex::<u64>, default_value = "0x20900280")]
    address: u64,
}

/// Enable the port, run one session over `input`/`output`, and disable the port again whatever
/// the session's outcome.  Hands the register back for release.
fn serve<R, I, O>(reg: R, input: I, output: O) -> anyhow::Result<R>
    where R: Register,
          I: Read,
          O: Write,
{
    let mut djtag = Djtag::new(reg);
    djtag.set_enabled(true);

    let result = protocol::serve(&mut djtag, input, output);

    djtag.set_enabled(false);
    let summary = result.context("remote_bitbang session failed")?;
    log::info!("{} commands, {} unknown, ended by {:?}", summary.commands, summary.unknown, summary.ending);
    Ok(djtag.into_inner())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("SC8810 DJTAG remote_bitbang JTAG driver");

    let reg = match DevMem::map(&args.mem, args.address) {
        Ok(reg) => reg,
        Err(e) => {
            log::error!("djtag register map failed: {:#}", anyhow::Error::from(e));
            return ExitCode::from(EXIT_INIT_FAILED);
        }
    };

    match serve(reg, io::stdin().lock(), io::stdout().lock()) {
        Ok(_reg) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
