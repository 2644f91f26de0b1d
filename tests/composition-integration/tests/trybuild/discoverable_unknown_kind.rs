use infrastructure_composition::discoverable;

#[discoverable(singleton)]
#[derive(Default)]
struct CoreModule;

fn main() {}
