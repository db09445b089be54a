//! Loads one corrupted-MNIST `.npz` archive and renders one digit to a PNG.

use corrupt_mnist::classifier::ClassifierConfig;
use corrupt_mnist::dataset::CorruptMnist;
use corrupt_mnist::render::render_digit;
use std::path::PathBuf;

const HELP: &str = "\
show-digit

Loads a corrupted-MNIST `.npz` archive and writes one image to a PNG file,
colour-mapped with a colour-scale legend.

USAGE:
    show-digit [OPTIONS] <ARCHIVE>

ARGS:
    <ARCHIVE>               Path to the `.npz` archive (e.g. corruptmnist/train_0.npz)

FLAGS:
    -h, --help              Show this help message and exit
    -c, --classify          Also run the (untrained) classifier over the batch
                            and print the scored digit for the selected image

OPTIONS:
    -i, --index <N>         Which image to render [default: 1]
    -o, --out <PATH>        Output PNG path [default: digit.png]
";

#[derive(Debug)]
struct AppArgs {
    archive: PathBuf,
    index: usize,
    out: PathBuf,
    classify: bool,
}

impl AppArgs {
    fn parse() -> Result<Self, pico_args::Error> {
        let mut pargs = pico_args::Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            println!("{}", HELP);
            std::process::exit(0);
        }

        let args = AppArgs {
            index: pargs.opt_value_from_str(["-i", "--index"])?.unwrap_or(1),
            out: pargs
                .opt_value_from_os_str(["-o", "--out"], parse_path)?
                .unwrap_or_else(|| PathBuf::from("digit.png")),
            classify: pargs.contains(["-c", "--classify"]),
            archive: pargs.free_from_os_str(parse_path)?,
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            panic!("unused arguments: {remaining:?}");
        }

        Ok(args)
    }
}

fn parse_path(s: &std::ffi::OsStr) -> Result<PathBuf, std::convert::Infallible> {
    Ok(s.into())
}

type MainBackend = burn::backend::NdArray<f32, i32>;

fn main() {
    let args = AppArgs::parse().expect("Failed to parse the arguments");

    let data = CorruptMnist::open(&args.archive).expect("Failed to open the archive");
    println!("loaded {} images from {:?}", data.len(), args.archive);

    let image = data.image(args.index).expect("Image index out of range");
    render_digit(image)
        .save(&args.out)
        .expect("Failed to save the rendered image");
    println!("wrote image {} to {:?}", args.index, args.out);

    if args.classify {
        let device = Default::default();
        let model = ClassifierConfig::new().init::<MainBackend>(&device);
        let scores = model
            .forward(data.to_tensor::<MainBackend>(&device))
            .expect("Failed to run the forward pass");

        let digits: Vec<i32> = scores
            .argmax(1)
            .squeeze::<1>(1)
            .into_data()
            .to_vec()
            .expect("Failed to read the scored digits");
        println!(
            "untrained model scores image {} as digit {}",
            args.index, digits[args.index]
        );
    }
}
