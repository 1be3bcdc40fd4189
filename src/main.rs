use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use xlsxquiz::{
    BatchOutcome, ColumnSchema, QuizError, QuizGenerator, QuizGeneratorBuilder, SheetSelector,
    DEFAULT_WATERMARK,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Generate one HTML quiz page per spreadsheet
    Generate {
        /// Spreadsheet files (.xlsx, .xlsm, .xls, .ods). Other files are reported as skipped.
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
        /// Directory the pages are written to
        #[arg(long, default_value = "outputs")]
        out_dir: PathBuf,
        /// Text stamped at the bottom of every page
        #[arg(long, env = "XLSXQUIZ_WATERMARK", default_value = DEFAULT_WATERMARK)]
        watermark: String,
        /// Sheet to read, by name or 0-based index. Defaults to the first sheet.
        #[arg(long)]
        sheet: Option<String>,
        /// Expect `prompt, A, B, C, D, answer` headers instead of the Chinese ones
        #[arg(long)]
        english_columns: bool,
    },
    /// Show the columns and first rows of a spreadsheet
    Preview {
        file: PathBuf,
        #[arg(long)]
        sheet: Option<String>,
        #[arg(long)]
        english_columns: bool,
    },
    /// Count the questions in a spreadsheet by kind
    Stats {
        file: PathBuf,
        #[arg(long)]
        sheet: Option<String>,
        #[arg(long)]
        english_columns: bool,
    },
}

fn sheet_selector(sheet: Option<String>) -> SheetSelector {
    match sheet {
        None => SheetSelector::First,
        Some(sheet) => match sheet.parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(sheet),
        },
    }
}

fn generator(
    sheet: Option<String>,
    english_columns: bool,
    watermark: Option<String>,
) -> Result<QuizGenerator, QuizError> {
    let columns = if english_columns {
        ColumnSchema::english()
    } else {
        ColumnSchema::default()
    };
    let mut builder = QuizGeneratorBuilder::new()
        .with_sheet_selector(sheet_selector(sheet))
        .with_columns(columns);
    if let Some(watermark) = watermark {
        builder = builder.with_watermark(watermark);
    }
    builder.build()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.filter_module("xlsxquiz", log::LevelFilter::Info);
        }
    }
    builder.init();
}

fn run(args: Args) -> Result<ExitCode, QuizError> {
    match args {
        Args::Generate {
            files,
            out_dir,
            watermark,
            sheet,
            english_columns,
        } => {
            let generator = generator(sheet, english_columns, Some(watermark))?;
            let report = generator.generate_batch(&files, &out_dir)?;
            println!("{report}");
            if report.outcome() == BatchOutcome::AllFailed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Args::Preview {
            file,
            sheet,
            english_columns,
        } => {
            let generator = generator(sheet, english_columns, None)?;
            let preview = generator.preview(File::open(&file)?, &file_name(&file))?;
            print!("{preview}");
        }
        Args::Stats {
            file,
            sheet,
            english_columns,
        } => {
            let generator = generator(sheet, english_columns, None)?;
            let outcome = generator.load_questions(File::open(&file)?)?;
            println!("{}: {}", file_name(&file), outcome.stats());
            for warning in &outcome.warnings {
                println!("  warning: {warning}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    init_logger();
    match run(Args::parse()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
