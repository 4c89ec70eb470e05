//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "healthport.toml")]
    pub output: String,

    /// Include every setting with explanatory comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Healthport configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Unzip your Apple Health export");
                println!("  2. Point [input] path at the apple_health_export directory");
                println!(
                    "  3. Validate configuration: healthport --config {} validate-config",
                    self.output
                );
                println!("  4. Run conversion: healthport --config {} convert", self.output);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Healthport Configuration File
# Apple Health export to CSV converter

[application]
log_level = "info"

[input]
path = "apple_health_export"

[output]
path = "."
subdirectory = "parsed"

[export]
categories = ["clinical_observations", "records", "workouts", "activity_summaries"]
concurrent = false
"#
        .to_string()
    }

    /// Generate configuration with every setting documented
    fn generate_config_with_examples() -> String {
        r#"# Healthport Configuration File
# Apple Health export to CSV converter
#
# Values may reference environment variables with ${VAR_NAME}.
# Every key can also be overridden with HEALTHPORT_<SECTION>_<KEY>,
# e.g. HEALTHPORT_INPUT_PATH or HEALTHPORT_EXPORT_CONCURRENT.

[application]
# trace | debug | info | warn | error
log_level = "info"

[input]
# Directory produced by unzipping export.zip
path = "apple_health_export"
# Clinical document (HL7 CDA)
cda_file = "export_cda.xml"
# Flat attribute-record export
export_file = "export.xml"
# Namespace of the clinical document elements
cda_namespace = "urn:hl7-org:v3"

[output]
# CSV files are written to <path>/<subdirectory>
path = "."
subdirectory = "parsed"
cda_file = "apple_health_parsed_cda.csv"
record_file = "apple_health_record.csv"
workout_file = "apple_health_workout.csv"
activity_summary_file = "apple_health_active_summary.csv"

[export]
# Used when `convert` is run without category flags
categories = ["clinical_observations", "records", "workouts", "activity_summaries"]
# Convert categories in parallel (each loads its own copy of the input)
concurrent = false
# Add the observation code's displayName as a `measurement` column
include_measurement = false

[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "logs"
# daily | hourly | never
local_rotation = "daily"
"#
        .to_string()
    }
}
