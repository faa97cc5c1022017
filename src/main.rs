use std::fs;
use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, ValueEnum};
use codespan_reporting::diagnostic::{Diagnostic as Rendered, Label, Severity as RenderedSeverity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use ast::diagnostic::{Diagnostic, Severity};
use parser::lexer::{Token, TokenStream};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Target {
    /// Dump the token stream and stop
    Tokens,
    /// Parse only and pretty-print the program
    Parse,
    /// Evaluate the program with the tree-walking interpreter
    Interpret,
    /// Compile to WebAssembly (default)
    Wasm,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input source files, compiled together as one program
    #[arg(required = true)]
    input: Vec<PathBuf>,
    /// Pipeline to run
    #[arg(short, long, value_enum, default_value = "wasm")]
    target: Target,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    // Source database: file ids are assigned in argument order and stamped
    // into every token span.
    let mut files: SimpleFiles<String, String> = SimpleFiles::new();
    let mut sources = Vec::new();
    for path in &args.input {
        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("{}: {}", path.display(), err);
                exit(1);
            }
        };
        files.add(path.display().to_string(), source.clone());
        sources.push(source);
    }

    let inputs: Vec<(usize, &str)> = sources
        .iter()
        .enumerate()
        .map(|(id, source)| (id, source.as_str()))
        .collect();
    let tokens = parser::lexer::tokenize(&inputs);
    log::debug!("lexed {} tokens from {} files", tokens.len(), sources.len());

    if args.target == Target::Tokens {
        dump_tokens(&args, &files, &sources);
        return;
    }

    let program = match parser::parse(tokens.into_iter(), sources.clone()) {
        Ok(program) => program,
        Err(diagnostics) => fail(&files, &diagnostics),
    };
    log::debug!("parsed {} modules", program.modules.len());

    if args.target == Target::Parse {
        print!("{}", ast::printer::print_program(&program));
        return;
    }

    let (program, table) = match analyzer::analyze(&program) {
        Ok(result) => result,
        Err(diagnostics) => fail(&files, &diagnostics),
    };
    log::debug!("name analysis done");

    if args.target == Target::Interpret {
        // The type checker still runs: interpretation is only defined for
        // well-typed programs.
        if let Err(diagnostics) = wasm::type_checker::check_program(&program, &table) {
            fail(&files, &diagnostics);
        }
        if let Err(err) = interpreter::run(&program, &table) {
            let diagnostic = Diagnostic::error(err.to_string(), err.span);
            fail(&files, &[diagnostic]);
        }
        return;
    }

    let module = match wasm::compile(&program, &table) {
        Ok(module) => module,
        Err(diagnostics) => fail(&files, &diagnostics),
    };
    log::debug!("emitted {} functions", module.functions.len());

    if let Err(err) = write_outputs(&args.input[0], &module) {
        eprintln!("{}", err);
        exit(1);
    }
}

/// Render diagnostics and exit with a failure code.
fn fail(files: &SimpleFiles<String, String>, diagnostics: &[Diagnostic]) -> ! {
    report(files, diagnostics);
    exit(1)
}

fn report(files: &SimpleFiles<String, String>, diagnostics: &[Diagnostic]) {
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = term::Config::default();
    for diagnostic in diagnostics {
        let severity = match diagnostic.severity {
            Severity::Warning => RenderedSeverity::Warning,
            Severity::Error | Severity::Fatal => RenderedSeverity::Error,
        };
        let rendered = Rendered::new(severity)
            .with_message(&diagnostic.message)
            .with_labels(vec![Label::primary(
                diagnostic.span.file,
                diagnostic.span.range(),
            )]);
        let _ = term::emit(&mut writer.lock(), &config, files, &rendered);
    }
}

fn dump_tokens(args: &Args, files: &SimpleFiles<String, String>, sources: &[String]) {
    let mut lex_errors = Vec::new();
    for (id, source) in sources.iter().enumerate() {
        println!("{}:", args.input[id].display());
        for (token, span) in TokenStream::new(id, source) {
            println!("  {:?} {}..{}", token, span.start, span.end);
            if let Token::Error(message) = token {
                lex_errors.push(Diagnostic::fatal(message, span));
            }
        }
    }
    if !lex_errors.is_empty() {
        fail(files, &lex_errors);
    }
}

// ─── Output files ─────────────────────────────────────────────────────────

/// Write `<program>.wat` and `<program>.html` next to the first input file,
/// plus a `wasmout/` directory holding the binary and a Node.js runner.
fn write_outputs(first_input: &Path, module: &wasm::instructions::WasmModule) -> Result<(), String> {
    let program = first_input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("program");
    let out_dir = first_input.parent().unwrap_or_else(|| Path::new("."));
    let wasmout = out_dir.join("wasmout");

    let write = |path: PathBuf, contents: &[u8]| -> Result<(), String> {
        fs::write(&path, contents).map_err(|err| format!("{}: {}", path.display(), err))
    };

    write(
        out_dir.join(format!("{}.wat", program)),
        wasm::wat::print_module(module).as_bytes(),
    )?;
    write(
        out_dir.join(format!("{}.html", program)),
        HTML_TEMPLATE.replace("__PROGRAM__", program).as_bytes(),
    )?;

    fs::create_dir_all(&wasmout).map_err(|err| format!("{}: {}", wasmout.display(), err))?;
    write(
        wasmout.join(format!("{}.wasm", program)),
        &wasm::binary::encode_module(module),
    )?;
    write(
        wasmout.join(format!("{}.js", program)),
        RUNNER_TEMPLATE.replace("__PROGRAM__", program).as_bytes(),
    )?;
    Ok(())
}

/// Browser shim: provides the `system.*` imports over the console and
/// `prompt`, then calls every exported `*_main` in order.
const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>__PROGRAM__</title>
</head>
<body>
  <p>Output is printed to the browser console.</p>
  <script>
    const memory = new WebAssembly.Memory({ initial: 100 });
    const bytes = new Uint8Array(memory.buffer);

    function readCString(ptr) {
      let end = ptr;
      while (bytes[end] !== 0) end++;
      return new TextDecoder().decode(bytes.subarray(ptr, end));
    }

    function writeLine(ptr, line) {
      const encoded = new TextEncoder().encode(line);
      bytes.set(encoded, ptr);
      let end = ptr + encoded.length;
      do { bytes[end++] = 0; } while (end % 4 !== 0);
      return end;
    }

    const system = {
      mem: memory,
      printInt: (n) => { console.log(n); return 0; },
      printString: (ptr) => { console.log(readCString(ptr)); return 0; },
      readInt: () => {
        const n = parseInt(prompt("readInt:"), 10);
        if (Number.isNaN(n)) throw new Error("invalid readInt input");
        return n;
      },
      readString0: (ptr) => writeLine(ptr, prompt("readString:") ?? ""),
    };

    WebAssembly.instantiateStreaming(fetch("wasmout/__PROGRAM__.wasm"), { system })
      .then(({ instance }) => {
        for (const [name, value] of Object.entries(instance.exports)) {
          if (name.endsWith("_main")) value();
        }
      });
  </script>
</body>
</html>
"#;

/// Node.js runner: stdin is consumed line by line for the read imports.
const RUNNER_TEMPLATE: &str = r#"const fs = require("fs");
const path = require("path");

const memory = new WebAssembly.Memory({ initial: 100 });
const bytes = new Uint8Array(memory.buffer);

let lines = [];
try {
  lines = fs.readFileSync(0, "utf8").split("\n");
} catch (err) {
  // No stdin available; reads will fail below.
}
let nextLine = 0;

function readLine() {
  if (nextLine >= lines.length) {
    console.error("unexpected end of input");
    process.exit(1);
  }
  return lines[nextLine++];
}

function readCString(ptr) {
  let end = ptr;
  while (bytes[end] !== 0) end++;
  return new TextDecoder().decode(bytes.subarray(ptr, end));
}

const system = {
  mem: memory,
  printInt: (n) => { console.log(n); return 0; },
  printString: (ptr) => { console.log(readCString(ptr)); return 0; },
  readInt: () => {
    const n = parseInt(readLine(), 10);
    if (Number.isNaN(n)) {
      console.error("invalid readInt input");
      process.exit(1);
    }
    return n;
  },
  readString0: (ptr) => {
    const encoded = new TextEncoder().encode(readLine());
    bytes.set(encoded, ptr);
    let end = ptr + encoded.length;
    do { bytes[end++] = 0; } while (end % 4 !== 0);
    return end;
  },
};

const wasm = fs.readFileSync(path.join(__dirname, "__PROGRAM__.wasm"));
WebAssembly.instantiate(wasm, { system }).then(({ instance }) => {
  for (const [name, value] of Object.entries(instance.exports)) {
    if (name.endsWith("_main")) value();
  }
});
"#;
