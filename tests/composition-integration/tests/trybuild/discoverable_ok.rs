use di_abstractions::DependencyRegistratorExt;
use infrastructure_common::DependencyResult;
use infrastructure_composition::{
    discoverable, AssemblyRegistry, ContainerModule, DynRegistrator, RegistratorModule,
};
use di_impl::DiContainerImpl;

pub struct Marker;

#[discoverable(registrator, container(DiContainerImpl))]
#[derive(Default)]
struct CoreModule;

impl RegistratorModule for CoreModule {
    fn register_module(&self, registrator: &DynRegistrator) -> DependencyResult<()> {
        registrator.register_transient_as::<Marker, Marker>()
    }
}

impl ContainerModule<DiContainerImpl> for CoreModule {
    fn register_module(&self, _container: &DiContainerImpl) -> DependencyResult<()> {
        Ok(())
    }
}

fn main() {
    assert!(!AssemblyRegistry::global().assembly_names().is_empty());
}
