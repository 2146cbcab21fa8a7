//! Mexflash command line interface.

use std::{process, time::Duration};

use clap::{crate_description, crate_name, crate_version, value_t, App, AppSettings::*, Arg};
use console::style;
use log::{debug, trace, LevelFilter};
use simplelog::*;

use mexflash as mf;

fn main() {
    println!("[MF] mexflash v{}", crate_version!());

    ctrlc::set_handler(move || {
        println!("🛑 received Ctrl+C!");
        process::exit(0);
    })
    .expect("Failed to install my Ctrl-C handler!");

    let matches = App::new(crate_name!())
        .version(format!("v{}", crate_version!()).as_str())
        .about(crate_description!())
        .long_about(
            "\n\
            Mexflash watches a mesh-extender board's U-Boot console over the \
            serial line and drives the flashing cycle hands-free. A board \
            still on the factory-default bootloader is recognized by its \
            banner and left to flash itself; a board already running the \
            custom bootloader has its auto-boot countdown interrupted so the \
            new firmware can be loaded.\n\
            \n\
            Whenever a board reaches its swap point, mexflash launches the \
            configured alert program so the operator can plug the next board \
            in. The process runs until terminated with Ctrl+C.\
        ",
        )
        .max_term_width(80)
        .setting(ColoredHelp)
        .setting(NextLineHelp)
        .arg(
            Arg::with_name("DEVICE_TTY")
                .help("the serial tty device the board's console is on")
                .long_help(
                    "the serial tty device the board's console is on; may \
                     change when the USB adapter is unplugged and re-plugged \
                     and may differ between systems.",
                )
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("BAUD_RATE")
                .help("serial port baud rate")
                .long_help(
                    "serial baud rate; must be one of the standard rates \
                     between 50 and 230400, anything else falls back to \
                     57600. The AP121 console runs at 115200.",
                )
                .short("-b")
                .long("--baud-rate")
                .takes_value(true)
                .default_value("115200")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("ALERT_CMD")
                .help("program launched when a board is ready to swap")
                .long_help(
                    "program launched, fire-and-forget, whenever a board \
                     reaches its swap point; typically plays a sound or \
                     flashes a light at the bench.",
                )
                .short("-a")
                .long("--alert-cmd")
                .takes_value(true)
                .default_value("flash-alert")
                .require_equals(true),
        )
        .arg(
            Arg::with_name("READ_TIMEOUT")
                .help("seconds a single console read waits for a byte")
                .short("-r")
                .long("--read-timeout")
                .takes_value(true)
                .default_value("10")
                .require_equals(true),
        )
        .arg(Arg::with_name("v").short("v").multiple(true).help(
            "Sets the logging level of verbosity, repeat several times for \
                higher verbosity",
        ))
        .get_matches();

    // Vary the output based on how many times the user used the "verbose"
    // flag (i.e. 'mexflash -v -v -v' or 'mexflash -vvv' vs 'mexflash -v'
    let log_level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    trace!("{:#?}", matches);

    // It's safe to call unwrap on the command line arguments with default
    // values, because the value will either be what the user input at
    // runtime or the default value.

    let baud_rate = value_t!(matches.value_of("BAUD_RATE"), u32).unwrap_or_else(|_| {
        println!(
            "{}: `{}` needs to be a numeric value",
            style("error").red(),
            style("baud-rate").cyan()
        );
        println!(
            "   {} `{}` is not a valid value",
            style("-->").cyan(),
            style(matches.value_of("BAUD_RATE").unwrap()).on_red()
        );
        process::exit(-1);
    });

    let read_timeout = value_t!(matches.value_of("READ_TIMEOUT"), u64).unwrap_or_else(|_| {
        println!(
            "{}: `{}` needs to be a numeric value",
            style("error").red(),
            style("read-timeout").cyan()
        );
        println!(
            "   {} `{}` is not a valid value",
            style("-->").cyan(),
            style(matches.value_of("READ_TIMEOUT").unwrap()).on_red()
        );
        process::exit(-1);
    });

    let settings = mf::SettingsBuilder::default()
        .path(matches.value_of("DEVICE_TTY").unwrap())
        .baud_rate(baud_rate)
        .alert_command(matches.value_of("ALERT_CMD").unwrap())
        .read_timeout(Duration::from_secs(read_timeout))
        .finalize();

    // Run the session state machine ===========================================

    let mut session = mf::factory(settings);
    let exit_code = session.run();
    debug!("exit code: {}", exit_code);
    std::process::exit(exit_code.into());
}
