//! Integration tests for the full generation pass.
//!
//! These run the generator against the fixture project in `testdata/app`
//! and check the helper file it writes.

use std::fs;
use std::path::PathBuf;

use facade_ide_helper::config::{Config, NamespaceGrouping};
use facade_ide_helper::registry::ContainerRegistry;
use facade_ide_helper::{Error, GenerationReport, Generator};
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Load the fixture config, redirecting the output into a temp dir.
fn fixture_config(out_dir: &TempDir) -> Config {
    let app = testdata_path().join("app");
    let mut config = Config::parse_file(app.join("facade-helper.yaml")).expect("should parse config");
    config.project_dir = Some(app);
    config.output = out_dir.path().join("_ide-helper.php");
    config
}

fn generate(config: Config) -> (GenerationReport, String) {
    let registry = ContainerRegistry::from_config(&config);
    let report = Generator::new(config, registry)
        .run()
        .expect("generation should succeed");
    let output = fs::read_to_string(&report.output).expect("helper file should exist");
    (report, output)
}

#[test]
fn test_report_counts() {
    let out = TempDir::new().unwrap();
    let (report, _) = generate(fixture_config(&out));

    // Tests/ is excluded; vendor/ is indexed but never scanned.
    assert_eq!(report.files_scanned, 8);
    // Trait and function-only files yield no candidate.
    assert_eq!(report.candidates, 6);

    let classes: Vec<_> = report.facades.iter().map(|f| f.class.as_str()).collect();
    assert_eq!(
        classes,
        vec!["App\\Facade\\Cache", "App\\Facade\\Mail", "App\\Support\\Clock"]
    );
}

#[test]
fn test_accessors_and_services() {
    let out = TempDir::new().unwrap();
    let (report, _) = generate(fixture_config(&out));

    let cache = &report.facades[0];
    assert_eq!(cache.accessor, "App\\Service\\CacheStore");
    assert_eq!(cache.service, "App\\Service\\CacheStore");
    assert_eq!(cache.methods, 4);

    let mail = &report.facades[1];
    assert_eq!(mail.accessor, "mailer");
    assert_eq!(mail.service, "App\\Service\\Mailer");
    assert_eq!(mail.methods, 3);

    let clock = &report.facades[2];
    assert_eq!(clock.accessor, "clock");
    assert_eq!(clock.service, "Acme\\Clock\\SystemClock");
    assert_eq!(clock.methods, 2);
}

#[test]
fn test_abstract_and_excluded_facades_absent() {
    let out = TempDir::new().unwrap();
    let (_, output) = generate(fixture_config(&out));

    assert!(!output.contains("class BaseFacade"));
    assert!(!output.contains("FakeMail"));
    assert!(!output.contains("getFacadeAccessor"));
}

#[test]
fn test_namespace_blocks() {
    let out = TempDir::new().unwrap();
    let (_, output) = generate(fixture_config(&out));

    assert!(output.starts_with("<?php\n\nnamespace App\\Facade {\n\n    class Cache\n    {\n"));
    assert_eq!(output.matches("namespace App\\Facade {").count(), 1);
    assert_eq!(output.matches("namespace App\\Support {").count(), 1);
    assert!(output.contains("    }\n}\n\nnamespace App\\Support {\n\n    class Clock\n"));
    assert!(output.ends_with("    }\n}\n\n"));
}

#[test]
fn test_mail_stub() {
    let out = TempDir::new().unwrap();
    let (_, output) = generate(fixture_config(&out));

    let send = "        /**
         * @param string $to
         * @param bool $cc
         * @return bool
         */
        public static function send(string $to, bool $cc = false): bool
        {
            /** @var \\App\\Service\\Mailer $instance */
            return $instance->send($to, $cc);
        }
";
    assert!(output.contains(send), "missing send stub in:\n{}", output);

    let queue = "        public static function queue(array $options = array (
  'retries' => 3,
  'delay' => NULL,
)): void
        {
            /** @var \\App\\Service\\Mailer $instance */
            $instance->queue($options);
        }
";
    assert!(output.contains(queue), "missing queue stub in:\n{}", output);

    assert!(output.contains(
        "        public static function withHeader(string $name, ?string $value = NULL): \\App\\Service\\Mailer\n"
    ));
    assert!(output.contains("         * @return \\App\\Service\\Mailer\n"));
    assert!(!output.contains("function create("));
    assert!(!output.contains("function transport("));
}

#[test]
fn test_cache_stub() {
    let out = TempDir::new().unwrap();
    let (_, output) = generate(fixture_config(&out));

    assert!(output.contains(
        "        public static function get(string $key, mixed $default = NULL): mixed\n"
    ));
    assert!(output.contains(
        "        public static function set(string $key, int|string $value, int $ttl = 3600): bool\n"
    ));
    assert!(output.contains("         * @param int|string $value\n"));
    assert!(output.contains(
        "        public static function tags(string ...$names): \\App\\Service\\CacheStore\n"
    ));
    assert!(output.contains("            return $instance->tags(...$names);\n"));
    // Trait methods follow the class's own methods.
    let tags = output.find("function tags(").unwrap();
    let remember = output.find("function remember(").unwrap();
    assert!(tags < remember);
    assert!(output.contains(
        "        public static function remember(string $key, callable $callback): mixed\n"
    ));
}

#[test]
fn test_clock_stub_from_index_path() {
    let out = TempDir::new().unwrap();
    let (_, output) = generate(fixture_config(&out));

    assert!(output.contains("        public static function now(): \\DateTimeImmutable\n"));
    assert!(output.contains("            /** @var \\Acme\\Clock\\SystemClock $instance */\n"));
    assert!(output.contains("            $instance->sleep($seconds);\n"));
}

#[test]
fn test_output_is_stable_across_runs() {
    let out = TempDir::new().unwrap();
    let (_, first) = generate(fixture_config(&out));
    let (_, second) = generate(fixture_config(&out));
    assert_eq!(first, second);

    let interleaved = Config {
        namespace_grouping: NamespaceGrouping::Interleaved,
        ..fixture_config(&out)
    };
    // The fixture is already namespace-ordered, so both policies agree.
    let (_, third) = generate(interleaved);
    assert_eq!(first, third);
}

#[test]
fn test_missing_service_aborts() {
    let out = TempDir::new().unwrap();
    let mut config = fixture_config(&out);
    config.services.remove("clock");

    let registry = ContainerRegistry::from_config(&config);
    let output = config.output.clone();
    match Generator::new(config, registry).run() {
        Err(Error::ServiceNotFound { id }) => assert_eq!(id, "clock"),
        other => panic!("expected ServiceNotFound, got {:?}", other),
    }
    assert!(!output.exists());
}
