mod cli;

use std::fs;
use std::process::ExitCode;

use compiscript_compiler::{Compilation, Error, dump};
use compiscript_mips::MipsGen;

use cli::Params;

fn main() -> ExitCode {
    let matches = cli::build_cli().get_matches();
    let params = Params::from_matches(&matches);
    run(&params)
}

fn run(params: &Params) -> ExitCode {
    let source = match fs::read_to_string(&params.source) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("No se pudo leer {}: {err}", params.source.display());
            return ExitCode::FAILURE;
        }
    };
    let path = params.source.display().to_string();

    let mut compilation = match Compilation::compile(&source) {
        Ok(compilation) => compilation,
        Err(Error::Parse(diags)) => {
            eprintln!("{}", diags.printer().source(&source).path(&path).render());
            eprintln!("No se genero el arbol por errores sintacticos.");
            return ExitCode::FAILURE;
        }
        Err(Error::Analyze(diags)) => {
            eprintln!("{}", diags.printer().source(&source).path(&path).render());
            eprintln!("{} error(es) semantico(s) encontrados.", diags.error_count());
            return ExitCode::FAILURE;
        }
    };

    println!("Chequeos semanticos OK.");
    println!("{}", compilation.analysis.symbols.dump());

    // With neither AST flag, both artifacts are written.
    let write_both = !params.ast_dump && !params.ast_dot;
    if params.ast_dump || write_both {
        if let Err(err) = fs::write("ast.txt", dump::dump_text(&compilation.program)) {
            eprintln!("No se pudo escribir ast.txt: {err}");
            return ExitCode::FAILURE;
        }
    }
    if params.ast_dot || write_both {
        if let Err(err) = fs::write("ast.dot", dump::dump_dot(&compilation.program)) {
            eprintln!("No se pudo escribir ast.dot: {err}");
            return ExitCode::FAILURE;
        }
    }

    if params.tac || params.mips {
        let code = compilation.generate_tac();
        let tac_text = compiscript_tac::render(&code);
        if let Err(err) = fs::write("tac.txt", &tac_text) {
            eprintln!("No se pudo escribir tac.txt: {err}");
            return ExitCode::FAILURE;
        }
        println!("TAC guardado en: tac.txt");

        if params.mips {
            let mut generator = MipsGen::new(&tac_text);
            let asm = generator.translate();
            if generator.unhandled_count() > 0 {
                eprintln!(
                    "{} instruccion(es) TAC sin traduccion MIPS (ver comentarios en out.s).",
                    generator.unhandled_count()
                );
            }
            if let Err(err) = fs::write("out.s", asm) {
                eprintln!("No se pudo escribir out.s: {err}");
                return ExitCode::FAILURE;
            }
            println!("MIPS guardado en: out.s");
        }
    }

    println!("Analisis completado.");
    ExitCode::SUCCESS
}
