use std::io::{self, BufRead, Write};

use argbind::{Config, Function, Metadata, Output, Parameters, Value, Wizard};

fn ask(name: &str, metadata: &Metadata, default: Option<&Value>) -> anyhow::Result<Value> {
    let hint = match (metadata.help_text(), default) {
        (Some(help), _) => format!(" ({help})"),
        (None, Some(default)) => format!(" [{default}]"),
        (None, None) => String::default(),
    };
    print!("{name}{hint}: ");
    io::stdout().flush()?;

    let mut line = String::default();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();

    Ok(match (answer.is_empty(), default) {
        (true, Some(default)) => default.clone(),
        (true, None) => Value::Null,
        (false, _) => Value::from(answer),
    })
}

fn main() -> anyhow::Result<()> {
    let greet = Function::new(
        "greet",
        Parameters::new()
            .required("name")
            .optional("greeting", "hello")
            .annotate("name", Metadata::positional().help("Who to greet."))
            .annotate("greeting", Metadata::option()),
        |call| Ok(Output::value(format!("{}, {}!", call.args[1], call.args[0]))),
    );
    let arguments: Vec<String> = std::env::args().skip(1).collect();
    let tokens: Vec<&str> = arguments.iter().map(String::as_str).collect();
    let wizard = Wizard::new(Config::default()).by_default(false);

    match wizard.call(&greet, &ask, &tokens) {
        Ok((_, output)) => println!("{}", output.collect()),
        Err(argbind::Error::Exit(code)) => std::process::exit(code),
        Err(error) => {
            eprintln!("{error}");
            std::process::exit(error.exit_code());
        }
    }

    Ok(())
}
