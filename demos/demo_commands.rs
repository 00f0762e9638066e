use argbind::{run, Call, Case, CommandSet, Metadata, Output, Parameters, Registry, Value};

struct Inventory {
    store: String,
    items: Vec<String>,
}

impl CommandSet for Inventory {
    fn name() -> &'static str {
        "inventory"
    }

    fn about() -> Option<String> {
        Some("Keep track of a store's inventory.".to_string())
    }

    fn commands() -> &'static [&'static str] {
        &["add", "list"]
    }

    fn case() -> Case {
        Case::Insensitive
    }

    fn constructor() -> Parameters {
        Parameters::new()
            .optional("store", "main")
            .annotate("store", Metadata::option().short("s").help("The store (default {default})."))
    }

    fn construct(call: Call) -> anyhow::Result<Self> {
        Ok(Inventory {
            store: call.args[0].to_string(),
            items: Vec::default(),
        })
    }

    fn parameters(command: &str) -> Parameters {
        match command {
            "add" => Parameters::new()
                .varargs("item")
                .annotate("item", Metadata::positional().help("The items to add.")),
            _ => Parameters::new(),
        }
    }

    fn describe(command: &str) -> Option<String> {
        match command {
            "add" => Some("Add items.".to_string()),
            _ => Some("List the items, one per line.".to_string()),
        }
    }

    fn invoke(&mut self, command: &str, call: Call) -> anyhow::Result<Output> {
        match command {
            "add" => {
                self.items
                    .extend(call.varargs.iter().map(Value::to_string));
                Ok(Output::value(self.items.len()))
            }
            _ => {
                let store = self.store.clone();
                let items: Vec<Value> = self
                    .items
                    .iter()
                    .map(|item| Value::from(format!("{store}: {item}")))
                    .collect();
                Ok(Output::lazy(items.into_iter()))
            }
        }
    }
}

fn main() {
    let registry = Registry::<Inventory>::new();
    let output = run(&registry);

    for item in output.into_items() {
        println!("{item}");
    }
}
