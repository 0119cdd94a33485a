//! The libraries this project vendors, in build order.

use std::path::Path;

use crate::consts::LIBRARIES_DIR;
use crate::library::LibrarySpec;
use crate::platform::{Os, static_lib_name};
use crate::toolchain::{BuildEnvironment, CompileFlag};

use super::BuildPlan;

const STDEXT_HASH_SILENCE: &str = "/D_SILENCE_STDEXT_HASH_DEPRECATION_WARNINGS";

const MIXER_CODECS: [&str; 5] = [
  "external/ogg",
  "external/vorbis",
  "external/flac",
  "external/opus",
  "external/opusfile",
];

fn top_level(name: &str) -> String {
  Path::new(LIBRARIES_DIR)
    .join(name)
    .to_string_lossy()
    .into_owned()
}

fn zlib() -> LibrarySpec {
  LibrarySpec::new("zlib").submodule(top_level("zlib"))
}

fn libpng() -> LibrarySpec {
  LibrarySpec::new("libpng")
    .submodule(top_level("libpng"))
    .option("PNG_SHARED", false)
    .option("PNG_TESTS", false)
    .depends_on("zlib")
}

fn curl(os: Option<Os>) -> LibrarySpec {
  let mut spec = LibrarySpec::new("curl")
    .submodule(top_level("curl"))
    .option("BUILD_CURL_EXE", false)
    .option("BUILD_SHARED_LIBS", false)
    .option("CMAKE_USE_LIBSSH2", false)
    .option("CURL_ZLIB", false)
    .option("HTTP_ONLY", true);
  if os.is_some_and(|os| os.is_windows()) {
    spec = spec.option("CMAKE_USE_WINSSL", true);
  }
  spec
}

fn fltk(os: Option<Os>) -> LibrarySpec {
  let zlib_name = if os.is_some_and(|os| os.is_windows()) { "zlibstatic" } else { "z" };

  LibrarySpec::new("fltk")
    .cxx()
    .submodule(top_level("fltk"))
    .option("OPTION_USE_SYSTEM_LIBJPEG", false)
    .option("OPTION_PRINT_SUPPORT", false)
    .option("OPTION_USE_GL", false)
    .option("FLTK_BUILD_TEST", false)
    .artifact("ZLIB_LIBRARY_RELEASE", Path::new("lib").join(static_lib_name(os, zlib_name)))
    .artifact("PNG_PNG_INCLUDE_DIR", "include/libpng16")
    .option("HAVE_PNG_H", true)
    .depends_on("zlib")
    .depends_on("libpng")
}

fn jsoncpp() -> LibrarySpec {
  LibrarySpec::new("jsoncpp")
    .cxx()
    .submodule(top_level("jsoncpp"))
    .option("JSONCPP_WITH_TESTS", false)
    .option("JSONCPP_WITH_POST_BUILD_UNITTEST", false)
    .option("JSONCPP_WITH_WARNING_AS_ERROR", false)
    .option("JSONCPP_WITH_PKGCONFIG_SUPPORT", false)
    .option("JSONCPP_WITH_CMAKE_PACKAGE", true)
    .option("CMAKE_DEBUG_POSTFIX", "d")
    .option("CCACHE_EXECUTABLE", "CCACHE_EXECUTABLE-NOTFOUND")
}

fn miniupnpc() -> LibrarySpec {
  LibrarySpec::new("miniupnpc")
    .source_dir("libraries/miniupnp/miniupnpc")
    .submodule(top_level("miniupnp"))
    .option("UPNPC_BUILD_SHARED", false)
    .option("UPNPC_BUILD_TESTS", false)
    .option("UPNPC_BUILD_SAMPLE", false)
}

fn protobuf(env: &BuildEnvironment) -> LibrarySpec {
  let mut spec = LibrarySpec::new("protobuf")
    .cxx()
    .source_dir("libraries/protobuf/cmake")
    .submodule(top_level("protobuf"))
    .option("protobuf_BUILD_SHARED_LIBS", false)
    .option("protobuf_BUILD_TESTS", false)
    .option("protobuf_MSVC_STATIC_RUNTIME", false);
  // VS 17.4 rejects <hash_map> without this.
  if env.has_flag(CompileFlag::Msvc) {
    spec = spec.cxxflags([STDEXT_HASH_SILENCE]);
  }
  spec
}

fn sdl2() -> LibrarySpec {
  LibrarySpec::new("SDL2")
    .submodule(top_level("SDL2"))
    .option("SDL_SHARED", false)
    .option("SDL_STATIC", true)
    .option("SDL_TEST", false)
}

fn sdl2_mixer() -> LibrarySpec {
  let parent = top_level("SDL2_mixer");
  let mut spec = LibrarySpec::new("SDL2_mixer").submodule(parent.clone());
  for codec in MIXER_CODECS {
    spec = spec.nested_submodule(parent.clone(), codec);
  }
  spec
    .option("SDL2MIXER_VENDORED", true)
    .option("SDL2MIXER_SAMPLES", false)
    .option("BUILD_SHARED_LIBS", false)
    .option("SDL2MIXER_MOD", false)
    .option("SDL2MIXER_MIDI_FLUIDSYNTH", false)
    .option("SDL2MIXER_WAVPACK", false)
    .depends_on("SDL2")
}

/// The full plan for `env` on `os`.
pub fn standard(env: &BuildEnvironment, os: Option<Os>) -> BuildPlan {
  BuildPlan::new()
    .then(zlib())
    .then(libpng())
    .then(curl(os))
    .then(fltk(os))
    .then(jsoncpp())
    .then(miniupnpc())
    .then(protobuf(env))
    .then(sdl2())
    .then(sdl2_mixer())
}
