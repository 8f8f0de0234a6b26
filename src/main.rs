#[cfg(not(feature = "export-wav"))]
fn main() {
    eprintln!(
        "The y8950 CLI requires the \"export-wav\" feature. Rebuild with `--features export-wav` to enable rendering."
    );
}

#[cfg(feature = "export-wav")]
mod cli {
    use std::env;
    use std::fs;
    use std::time::Instant;

    use anyhow::{bail, Context};
    use log::info;
    use y8950::config::{DEFAULT_CLOCK, DEFAULT_SAMPLE_RATE};
    use y8950::{parse_script, run_script, write_wav_file, ChipConfig, Y8950};

    const USAGE: &str = "Usage:\n  y8950 [--clock <hz>] [--rate <hz>] <script.txt> <out.wav>\n\nFlags:\n  --clock <hz>    Input clock (default 3579545)\n  --rate <hz>     Output sample rate (default 44100)\n  -h, --help      Show this help\n\nScript format:\n  w <addr> <value>   register write, hex\n  t <samples>        render samples, decimal\n  # comment\n";

    struct Options {
        config: ChipConfig,
        script: String,
        output: String,
    }

    fn parse_number(flag: &str, value: Option<String>) -> anyhow::Result<u32> {
        let value = value.with_context(|| format!("{flag} requires an argument"))?;
        value
            .parse()
            .with_context(|| format!("{flag}: '{value}' is not a number"))
    }

    fn parse_args() -> anyhow::Result<Option<Options>> {
        let mut clock = DEFAULT_CLOCK;
        let mut rate = DEFAULT_SAMPLE_RATE;
        let mut positional = Vec::new();

        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--help" | "-h" => return Ok(None),
                "--clock" => clock = parse_number("--clock", args.next())?,
                "--rate" => rate = parse_number("--rate", args.next())?,
                _ if arg.starts_with("--clock=") => {
                    clock = parse_number("--clock", Some(arg[8..].to_string()))?
                }
                _ if arg.starts_with("--rate=") => {
                    rate = parse_number("--rate", Some(arg[7..].to_string()))?
                }
                _ if arg.starts_with('-') => bail!("unknown flag: {arg}"),
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        match (positional.next(), positional.next(), positional.next()) {
            (Some(script), Some(output), None) => Ok(Some(Options {
                config: ChipConfig::new(clock, rate),
                script,
                output,
            })),
            _ => Ok(None),
        }
    }

    pub fn run() -> anyhow::Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let Some(options) = parse_args()? else {
            eprint!("{USAGE}");
            return Ok(());
        };

        let text = fs::read_to_string(&options.script)
            .with_context(|| format!("failed to read script '{}'", options.script))?;
        let commands = parse_script(&text)
            .with_context(|| format!("failed to parse script '{}'", options.script))?;

        let mut chip: Y8950 = Y8950::from_config(options.config)?;
        info!(
            "rendering {} commands at {} Hz clock, {} Hz output",
            commands.len(),
            options.config.clock,
            options.config.sample_rate
        );

        let start = Instant::now();
        let samples = run_script(&mut chip, &commands);
        let elapsed = start.elapsed();
        let seconds = samples.len() as f32 / options.config.sample_rate as f32;
        info!(
            "rendered {} samples ({:.2}s of audio) in {:.1} ms",
            samples.len(),
            seconds,
            elapsed.as_secs_f64() * 1000.0
        );

        write_wav_file(&options.output, &samples, options.config.sample_rate)
            .with_context(|| format!("failed to write '{}'", options.output))?;
        Ok(())
    }
}

#[cfg(feature = "export-wav")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
