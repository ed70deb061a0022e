use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;

use vendnet_core::{DomainError, Entity, MachineId};

use crate::Machine;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("machine {0} already exists")]
    AlreadyExists(MachineId),

    #[error("machine {0} does not exist")]
    NotFound(MachineId),
}

impl From<RepositoryError> for DomainError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::AlreadyExists(id) => {
                DomainError::conflict(format!("machine {id} already exists"))
            }
            RepositoryError::NotFound(id) => DomainError::not_found(format!("machine {id}")),
        }
    }
}

/// Keyed persistence of machine records.
///
/// Storage semantics are up to the implementation; the stock handlers only rely
/// on `find_by_id` returning what the last successful `save`/`update` stored.
pub trait MachineRepository: Send + Sync {
    fn find_by_id(&self, id: &MachineId) -> Option<Machine>;

    fn find_all(&self) -> Vec<Machine>;

    /// Insert a new record. Fails if the id is already present.
    fn save(&self, machine: Machine) -> Result<(), RepositoryError>;

    /// Replace an existing record. Fails if the id is not present.
    fn update(&self, machine: Machine) -> Result<(), RepositoryError>;

    /// Remove a record. Fails if the id is not present.
    fn delete(&self, id: &MachineId) -> Result<(), RepositoryError>;
}

impl<R> MachineRepository for Arc<R>
where
    R: MachineRepository + ?Sized,
{
    fn find_by_id(&self, id: &MachineId) -> Option<Machine> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Vec<Machine> {
        (**self).find_all()
    }

    fn save(&self, machine: Machine) -> Result<(), RepositoryError> {
        (**self).save(machine)
    }

    fn update(&self, machine: Machine) -> Result<(), RepositoryError> {
        (**self).update(machine)
    }

    fn delete(&self, id: &MachineId) -> Result<(), RepositoryError> {
        (**self).delete(id)
    }
}

/// In-memory machine store for tests/dev.
///
/// `find_all` returns machines ordered by id.
#[derive(Debug, Default)]
pub struct InMemoryMachineRepository {
    machines: RwLock<BTreeMap<MachineId, Machine>>,
}

impl InMemoryMachineRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MachineRepository for InMemoryMachineRepository {
    fn find_by_id(&self, id: &MachineId) -> Option<Machine> {
        let machines = self.machines.read().unwrap_or_else(PoisonError::into_inner);
        machines.get(id).cloned()
    }

    fn find_all(&self) -> Vec<Machine> {
        let machines = self.machines.read().unwrap_or_else(PoisonError::into_inner);
        machines.values().cloned().collect()
    }

    fn save(&self, machine: Machine) -> Result<(), RepositoryError> {
        let mut machines = self.machines.write().unwrap_or_else(PoisonError::into_inner);
        if machines.contains_key(machine.id()) {
            return Err(RepositoryError::AlreadyExists(machine.id().clone()));
        }
        machines.insert(machine.id().clone(), machine);
        Ok(())
    }

    fn update(&self, machine: Machine) -> Result<(), RepositoryError> {
        let mut machines = self.machines.write().unwrap_or_else(PoisonError::into_inner);
        match machines.get_mut(machine.id()) {
            Some(slot) => {
                *slot = machine;
                Ok(())
            }
            None => Err(RepositoryError::NotFound(machine.id().clone())),
        }
    }

    fn delete(&self, id: &MachineId) -> Result<(), RepositoryError> {
        let mut machines = self.machines.write().unwrap_or_else(PoisonError::into_inner);
        machines
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.clone()))
    }
}
