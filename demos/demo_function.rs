use argbind::{run, Function, Metadata, Output, Parameters, Value};

fn main() {
    let join = Function::new(
        "join",
        Parameters::new()
            .optional("reverse", false)
            .optional("separator", " ")
            .varargs("word")
            .annotate("reverse", Metadata::flag().short("r").help("Join in reverse order."))
            .annotate("separator", Metadata::option())
            .annotate("word", Metadata::positional().help("The words to join.")),
        |call| {
            let mut words: Vec<String> = call.varargs.iter().map(Value::to_string).collect();

            if call.args[0].is_truthy() {
                words.reverse();
            }

            let joined = words.join(&call.args[1].to_string());
            println!("{joined}");
            Ok(Output::value(joined))
        },
    )
    .about("Join words together.");

    run(&join);
}
