use std::path::PathBuf;

use libforge_lib::pipeline::{self, marker::read_marker};
use libforge_lib::process::RecordingRunner;
use libforge_lib::LibrarySpec;

use super::common::{CMAKE, Workspace, built_library, defines};

#[tokio::test]
async fn zlib_with_no_options() {
  let ws = Workspace::new();
  let runner = RecordingRunner::new();
  let spec = LibrarySpec::new("zlib");

  let built = pipeline::build(&ws.ctx, &runner, &spec).await.unwrap();

  let invs = runner.invocations();
  assert_eq!(invs.len(), 2);

  let configure = &invs[0];
  assert_eq!(configure.program, PathBuf::from(CMAKE));
  let source = ws.root().join("libraries").join("zlib");
  let build = ws.root().join("build").join("zlib");
  assert_eq!(configure.flag_value("-S"), Some(source.to_str().unwrap()));
  assert_eq!(configure.flag_value("-B"), Some(build.to_str().unwrap()));
  assert_eq!(defines(configure).len(), 2);

  let install = &invs[1];
  assert_eq!(built_library(install).as_deref(), Some("zlib"));
  assert_eq!(install.flag_value("--config"), Some("RelWithDebInfo"));
  assert_eq!(install.flag_value("--target"), Some("install"));

  assert_eq!(built.configs, vec!["RelWithDebInfo"]);
  assert!(read_marker(&build).unwrap().is_some());
}

#[tokio::test]
async fn fltk_cxx_with_four_options() {
  let ws = Workspace::new();
  let runner = RecordingRunner::new();
  let spec = LibrarySpec::new("fltk")
    .cxx()
    .option("OPTION_USE_SYSTEM_LIBJPEG", false)
    .option("OPTION_PRINT_SUPPORT", false)
    .option("OPTION_USE_GL", false)
    .option("FLTK_BUILD_TEST", false);

  pipeline::build(&ws.ctx, &runner, &spec).await.unwrap();

  let invs = runner.invocations();
  let tokens = defines(&invs[0]);
  assert_eq!(tokens.len(), 6);
  assert!(tokens.contains(&"-DOPTION_USE_GL=OFF".to_string()));

  let prefix = ws.prefix();
  assert!(tokens.contains(&format!("-DCMAKE_PREFIX_PATH={}", prefix.display())));
  assert!(tokens.contains(&format!("-DCMAKE_INSTALL_PREFIX={}", prefix.display())));

  let configs: Vec<_> = invs.iter().filter_map(|i| i.flag_value("--config")).collect();
  assert_eq!(configs, vec!["Debug", "RelWithDebInfo"]);
}

#[tokio::test]
async fn cxxflags_never_leak_into_this_process() {
  let ws = Workspace::new();
  let runner = RecordingRunner::new();
  let spec = LibrarySpec::new("protobuf")
    .cxx()
    .cxxflags(["/D_SILENCE_STDEXT_HASH_DEPRECATION_WARNINGS"]);
  let before = std::env::var_os("CXXFLAGS");

  pipeline::build(&ws.ctx, &runner, &spec).await.unwrap();

  let invs = runner.invocations();
  assert!(invs[0].env.contains_key("CXXFLAGS"));
  assert!(invs[1..].iter().all(|i| i.env.is_empty()));
  assert_eq!(std::env::var_os("CXXFLAGS"), before);
}

#[tokio::test]
async fn failed_rebuild_is_not_reported_as_installed() {
  let ws = Workspace::new();
  let spec = LibrarySpec::new("zlib");
  let build = ws.root().join("build").join("zlib");

  pipeline::build(&ws.ctx, &RecordingRunner::new(), &spec).await.unwrap();
  assert!(read_marker(&build).unwrap().is_some());

  let failing = RecordingRunner::new().with_hook(|inv| inv.position("-S").map(|_| 1));
  pipeline::build(&ws.ctx, &failing, &spec).await.unwrap_err();

  assert!(read_marker(&build).unwrap().is_none());
}
