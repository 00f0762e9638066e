use argbind::{run, Arguments, Function, Output};

#[derive(Arguments)]
struct Summer {
    #[argbind(varargs, help = "The items to sum.")]
    items: Vec<u32>,
    #[argbind(short = 'n', help = "Negate the sum.")]
    negate: bool,
}

fn main() {
    let summer = Function::typed("summer", |summer: Summer| {
        let sum: i64 = summer.items.iter().map(|item| *item as i64).sum();
        let sum = if summer.negate { -sum } else { sum };
        println!("Sum: {sum}");
        Ok(Output::value(sum))
    });

    run(&summer);
}
