use clap::{crate_version, App, AppSettings, Arg};
use gifslim::progress::{NoProgress, ProgressBar, ProgressReporter};
use gifslim::source;
use gifslim::Settings;

mod error;
use crate::error::*;

use std::fs::File;
use std::path::Path;
use std::time::Duration;

fn main() {
    if let Err(e) = bin_main() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn bin_main() -> BinResult<()> {
    let matches = App::new("gifslim")
        .version(crate_version!())
        .about("Shrinks animated GIFs by sampling frames and re-quantizing them in parallel")
        .setting(AppSettings::UnifiedHelpMessage)
        .setting(AppSettings::DeriveDisplayOrder)
        .setting(AppSettings::ArgRequiredElseHelp)
        .arg(Arg::with_name("output")
            .long("output")
            .short("o")
            .help("Destination file to write to")
            .empty_values(false)
            .takes_value(true)
            .value_name("a.gif")
            .required(true))
        .arg(Arg::with_name("every")
            .long("every")
            .help("Keep only every Nth frame (delays are scaled to match)")
            .empty_values(false)
            .value_name("N")
            .default_value("2"))
        .arg(Arg::with_name("quality")
            .long("quality")
            .value_name("1-100")
            .takes_value(true)
            .help("Lower quality may give a smaller file"))
        .arg(Arg::with_name("width")
            .long("width")
            .short("W")
            .takes_value(true)
            .value_name("px")
            .help("Output canvas width [default: source width]"))
        .arg(Arg::with_name("height")
            .long("height")
            .short("H")
            .takes_value(true)
            .value_name("px")
            .help("Output canvas height [default: source height]"))
        .arg(Arg::with_name("fast")
            .long("fast")
            .help("Faster encoding, but lower quality and a bigger file"))
        .arg(Arg::with_name("once")
            .long("once")
            .help("Do not loop the GIF"))
        .arg(Arg::with_name("quiet")
            .long("quiet")
            .help("Do not show a progress bar"))
        .arg(Arg::with_name("INPUT")
            .help("GIF file to re-encode")
            .empty_values(false)
            .required(true))
        .get_matches_from(wild::args_os());

    let input = Path::new(matches.value_of_os("INPUT").ok_or("Missing input")?);
    let output = Path::new(matches.value_of_os("output").ok_or("Missing output")?);
    let quiet = matches.is_present("quiet");

    let frames = source::decode_frames(input)?;
    let first = frames.first().ok_or("No frames in the input GIF")?;

    let mut settings = Settings::new(
        parse_opt(matches.value_of("width"))?.unwrap_or(first.image.width() as u16),
        parse_opt(matches.value_of("height"))?.unwrap_or(first.image.height() as u16),
    );
    settings.sample_every = matches.value_of("every").ok_or("Missing every")?.parse::<usize>()?.max(1);
    settings.quality = parse_opt(matches.value_of("quality"))?.unwrap_or(100).min(100);
    settings.fast = matches.is_present("fast");
    if matches.is_present("once") {
        settings.loop_count = None;
    }

    let retained = (frames.len() + settings.sample_every - 1) / settings.sample_every;
    let mut progress: Box<dyn ProgressReporter> = if quiet {
        Box::new(NoProgress {})
    } else {
        let mut pb = ProgressBar::new(retained as u64);
        pb.show_speed = false;
        pb.show_percent = false;
        pb.format(" #_. ");
        pb.message("Frame ");
        pb.set_max_refresh_rate(Some(Duration::from_millis(250)));
        Box::new(pb)
    };

    let encoder = gifslim::Encoder::new(settings)?;
    encoder.encode(frames, File::create(output).map_err(|e| format!("Can't write to {}: {}", output.display(), e))?, &mut *progress)?;

    let shown = dunce::canonicalize(output).unwrap_or_else(|_| output.to_path_buf());
    progress.done(&format!("gifslim created {}", shown.display()));
    Ok(())
}

fn parse_opt<T: ::std::str::FromStr<Err = ::std::num::ParseIntError>>(s: Option<&str>) -> BinResult<Option<T>> {
    match s {
        Some(s) => Ok(Some(s.parse()?)),
        None => Ok(None),
    }
}
