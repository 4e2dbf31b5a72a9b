//! Request dispatch.
//!
//! A thin router from the closed operation enumeration to engine calls.
//! The handler table is built once at construction; dispatching a request
//! validates the argument count, then hands the flat text arguments to
//! the bound handler. Results travel as a serde [`Response`], so absent
//! and empty listings serialize as empty sequences rather than errors.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assembly::AssemblyRecord;
use crate::engine::{AssemblyInput, PackageInput, PackageUpdate, TraceEngine};
use crate::error::{TrackError, TrackResult, ValidationError};
use crate::package::PackageRecord;
use crate::request::{OpKind, Request};

/// The result of a dispatched operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "body", rename_all = "snake_case")]
pub enum Response {
    /// A single assembly (mutation result or point read).
    Assembly(AssemblyRecord),
    /// A sequence of assemblies (listing or history snapshots).
    Assemblies(Vec<AssemblyRecord>),
    /// A single package.
    Package(PackageRecord),
    /// A sequence of packages.
    Packages(Vec<PackageRecord>),
    /// Raw primary-key listing.
    Ids(Vec<String>),
    /// An identity lookup; `None` if the name is unmapped.
    Role(Option<String>),
    /// A mutation with no payload to return.
    Ack,
}

/// Serialize a response to pretty JSON.
pub fn to_json_pretty(response: &Response) -> Result<String, TrackError> {
    serde_json::to_string_pretty(response)
        .map_err(|e| TrackError::internal(format!("serialize response: {e}")))
}

type Handler = fn(&TraceEngine, &[String]) -> TrackResult<Response>;

/// Routes requests to engine calls through a table resolved once at
/// construction.
pub struct Dispatcher {
    engine: TraceEngine,
    table: HashMap<OpKind, Handler>,
}

impl Dispatcher {
    /// Builds the handler table and wraps the engine.
    #[must_use]
    pub fn new(engine: TraceEngine) -> Self {
        let table = OpKind::ALL
            .into_iter()
            .map(|op| (op, handler_for(op)))
            .collect();
        Self { engine, table }
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &TraceEngine {
        &self.engine
    }

    /// Executes a request.
    pub fn dispatch(&self, request: &Request) -> TrackResult<Response> {
        let expected = request.op.arity();
        if request.args.len() != expected {
            return Err(ValidationError::WrongArgumentCount {
                op: request.op.name(),
                expected,
                actual: request.args.len(),
            }
            .into());
        }
        let handler = self
            .table
            .get(&request.op)
            .ok_or_else(|| TrackError::internal(format!("no handler bound for {}", request.op.name())))?;
        handler(&self.engine, &request.args)
    }

    /// Resolves a wire name and executes in one step.
    pub fn dispatch_named(&self, name: &str, args: &[String]) -> TrackResult<Response> {
        let op = OpKind::parse(name)?;
        self.dispatch(&Request::new(op, args.to_vec()))
    }
}

fn handler_for(op: OpKind) -> Handler {
    match op {
        OpKind::CreateAssembly => create_assembly,
        OpKind::UpdateAssemblyById => update_assembly_by_id,
        OpKind::UpdateAssemblyStatusById => update_assembly_status_by_id,
        OpKind::UpdateAssemblySecondaryHashById => update_assembly_secondary_hash_by_id,
        OpKind::CreatePackage => create_package,
        OpKind::UpdatePackage => update_package,
        OpKind::UpdatePackageSecondaryHashById => update_package_secondary_hash_by_id,
        OpKind::RegisterIdentity => register_identity,
        OpKind::GetAssemblyById => get_assembly_by_id,
        OpKind::GetAllAssemblies => get_all_assemblies,
        OpKind::GetAssembliesByBatchNumber => get_assemblies_by_batch_number,
        OpKind::GetAssembliesByDate => get_assemblies_by_date,
        OpKind::GetAssembliesByBatchAndDate => get_assemblies_by_batch_and_date,
        OpKind::GetAssemblyHistoryById => get_assembly_history_by_id,
        OpKind::GetAssemblyHistoryByDate => get_assembly_history_by_date,
        OpKind::GetAssemblyHistoryByBatchAndDate => get_assembly_history_by_batch_and_date,
        OpKind::GetPackageById => get_package_by_id,
        OpKind::GetAllPackages => get_all_packages,
        OpKind::GetPackagesByAssemblyReference => get_packages_by_assembly_reference,
        OpKind::GetPackagesByDate => get_packages_by_date,
        OpKind::GetPackagesByAssemblyReferenceAndDate => get_packages_by_assembly_reference_and_date,
        OpKind::GetPackageHistoryById => get_package_history_by_id,
        OpKind::GetPackageHistoryByDate => get_package_history_by_date,
        OpKind::ListAllAssemblyIds => list_all_assembly_ids,
        OpKind::ListAllPackageIds => list_all_package_ids,
        OpKind::LookupIdentity => lookup_identity,
    }
}

fn assembly_input(args: &[String]) -> AssemblyInput {
    AssemblyInput {
        assembly_id: args[0].clone(),
        device_serial_no: args[1].clone(),
        device_type: args[2].clone(),
        filament_batch_id: args[3].clone(),
        led_batch_id: args[4].clone(),
        circuit_board_batch_id: args[5].clone(),
        wire_batch_id: args[6].clone(),
        casing_batch_id: args[7].clone(),
        adaptor_batch_id: args[8].clone(),
        stick_pod_batch_id: args[9].clone(),
        manufacturing_plant: args[10].clone(),
        status: args[11].clone(),
        assembly_date: args[12].clone(),
    }
}

fn create_assembly(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    let record = engine.create_assembly(&assembly_input(args), &args[13])?;
    Ok(Response::Assembly(record))
}

fn update_assembly_by_id(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    let record = engine.update_assembly(&assembly_input(args), &args[13])?;
    Ok(Response::Assembly(record))
}

fn update_assembly_status_by_id(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    let record = engine.update_assembly_status(&args[0], &args[1], &args[2])?;
    Ok(Response::Assembly(record))
}

fn update_assembly_secondary_hash_by_id(
    engine: &TraceEngine,
    args: &[String],
) -> TrackResult<Response> {
    let record = engine.stamp_assembly(&args[0], &args[1], &args[2])?;
    Ok(Response::Assembly(record))
}

fn create_package(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    let input = PackageInput {
        case_id: args[0].clone(),
        holder_assembly_id: args[1].clone(),
        charger_assembly_id: args[2].clone(),
        status: args[3].clone(),
        packaging_date: args[4].clone(),
        shipping_address: args[5].clone(),
        assembly_status: args[6].clone(),
    };
    let record = engine.create_package(&input, &args[7])?;
    Ok(Response::Package(record))
}

fn update_package(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    let update = PackageUpdate {
        case_id: args[0].clone(),
        status: args[1].clone(),
        shipping_address: args[2].clone(),
        assembly_status: args[3].clone(),
    };
    let record = engine.update_package(&update, &args[4])?;
    Ok(Response::Package(record))
}

fn update_package_secondary_hash_by_id(
    engine: &TraceEngine,
    args: &[String],
) -> TrackResult<Response> {
    let record = engine.stamp_package(&args[0], &args[1], &args[2])?;
    Ok(Response::Package(record))
}

fn register_identity(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    engine.register_identity(&args[0], &args[1])?;
    Ok(Response::Ack)
}

fn get_assembly_by_id(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Assembly(engine.get_assembly(&args[0], &args[1])?))
}

fn get_all_assemblies(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Assemblies(engine.assemblies(&args[0])?))
}

fn get_assemblies_by_batch_number(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Assemblies(engine.assemblies_by_batch(
        &args[0], &args[1], &args[2],
    )?))
}

fn get_assemblies_by_date(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Assemblies(engine.assemblies_by_date(
        &args[0], &args[1], &args[2],
    )?))
}

fn get_assemblies_by_batch_and_date(
    engine: &TraceEngine,
    args: &[String],
) -> TrackResult<Response> {
    Ok(Response::Assemblies(engine.assemblies_by_batch_and_date(
        &args[0], &args[1], &args[2], &args[3], &args[4],
    )?))
}

fn get_assembly_history_by_id(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Assemblies(
        engine.assembly_history(&args[0], &args[1])?,
    ))
}

fn get_assembly_history_by_date(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Assemblies(engine.assembly_history_by_date(
        &args[0], &args[1], &args[2],
    )?))
}

fn get_assembly_history_by_batch_and_date(
    engine: &TraceEngine,
    args: &[String],
) -> TrackResult<Response> {
    Ok(Response::Assemblies(
        engine.assembly_history_by_batch_and_date(&args[0], &args[1], &args[2], &args[3], &args[4])?,
    ))
}

fn get_package_by_id(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Package(engine.get_package(&args[0], &args[1])?))
}

fn get_all_packages(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Packages(engine.packages(&args[0])?))
}

fn get_packages_by_assembly_reference(
    engine: &TraceEngine,
    args: &[String],
) -> TrackResult<Response> {
    Ok(Response::Packages(engine.packages_by_reference(
        &args[0], &args[1], &args[2],
    )?))
}

fn get_packages_by_date(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Packages(engine.packages_by_date(
        &args[0], &args[1], &args[2],
    )?))
}

fn get_packages_by_assembly_reference_and_date(
    engine: &TraceEngine,
    args: &[String],
) -> TrackResult<Response> {
    Ok(Response::Packages(engine.packages_by_reference_and_date(
        &args[0], &args[1], &args[2], &args[3], &args[4],
    )?))
}

fn get_package_history_by_id(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Packages(
        engine.package_history(&args[0], &args[1])?,
    ))
}

fn get_package_history_by_date(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Packages(engine.package_history_by_date(
        &args[0], &args[1], &args[2],
    )?))
}

fn list_all_assembly_ids(engine: &TraceEngine, _args: &[String]) -> TrackResult<Response> {
    Ok(Response::Ids(engine.list_assembly_ids()?))
}

fn list_all_package_ids(engine: &TraceEngine, _args: &[String]) -> TrackResult<Response> {
    Ok(Response::Ids(engine.list_package_ids()?))
}

fn lookup_identity(engine: &TraceEngine, args: &[String]) -> TrackResult<Response> {
    Ok(Response::Role(engine.lookup_identity(&args[0])?))
}
