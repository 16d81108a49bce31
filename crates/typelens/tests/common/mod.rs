//! Shared catalog fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use typelens::{
    Annotation, CatalogBuilder, FieldDefinition, GenericParam, MethodDefinition, ModuleId,
    TypeCatalog, TypeDefinition, TypeRef,
};
use typelens_sdk::{CallError, CallFrame, CallResult, TypeId, Value};

// Rust-side markers bound to catalog types
pub struct TestClass;
pub struct ITestInterface;
pub struct Counter;

#[derive(Debug, PartialEq)]
pub struct AttributeA(pub &'static str);
impl Annotation for AttributeA {}

#[derive(Debug, PartialEq)]
pub struct AttributeB;
impl Annotation for AttributeB {}

#[derive(Debug, PartialEq)]
pub struct DerivedAttributeA;
impl Annotation for DerivedAttributeA {}

#[derive(Debug, PartialEq)]
pub struct LocalOnly(pub u32);
impl Annotation for LocalOnly {
    const INHERITED: bool = false;
}

pub struct Fixture {
    pub catalog: Arc<TypeCatalog>,
    pub tests: ModuleId,
    pub collections: ModuleId,

    pub test_class: TypeId,
    pub derived_a: TypeId,
    pub derived_b: TypeId,
    pub derived_c: TypeId,
    pub derived_d: TypeId,
    pub test_struct: TypeId,
    pub test_enum: TypeId,
    pub test_container: TypeId,
    pub interface: TypeId,
    pub interface_derived: TypeId,
    pub class_c: TypeId,
    pub class_c_derived: TypeId,
    pub counter: TypeId,

    pub list: TypeId,
    pub list_i32: TypeId,
    pub dictionary: TypeId,
    pub dict_i32_string: TypeId,
    pub dict_string_i32: TypeId,
    pub i32_array: TypeId,
}

fn identity(frame: CallFrame<'_>) -> CallResult<Value> {
    frame.value(0).cloned()
}

fn concat(frame: CallFrame<'_>) -> CallResult<Value> {
    Ok(Value::str(format!("{}{}", frame.value(0)?, frame.value(1)?)))
}

fn test_class_methods(def: TypeDefinition) -> TypeDefinition {
    def.method(
        MethodDefinition::new("TestStaticGenericMethodA", identity)
            .generic_param(GenericParam::new("T"))
            .param("value", TypeRef::MethodParam(0))
            .returns(TypeRef::MethodParam(0))
            .as_static(),
    )
    .method(
        MethodDefinition::new("TestStaticGenericMethodB", concat)
            .generic_param(GenericParam::new("T1"))
            .generic_param(GenericParam::new("T2"))
            .param("s", TypeRef::MethodParam(0))
            .param("n", TypeRef::MethodParam(1))
            .returns(TypeId::STRING)
            .as_static(),
    )
    .method(
        MethodDefinition::new("TestGenericMethodA", identity)
            .generic_param(GenericParam::new("T"))
            .param("value", TypeRef::MethodParam(0))
            .returns(TypeRef::MethodParam(0)),
    )
    .method(
        MethodDefinition::new("TestGenericMethodB", concat)
            .generic_param(GenericParam::new("T1"))
            .generic_param(GenericParam::new("T2"))
            .param("s", TypeRef::MethodParam(0))
            .param("n", TypeRef::MethodParam(1))
            .returns(TypeId::STRING),
    )
    .method(
        MethodDefinition::new("TestStaticMethodA", |f| Ok(Value::I32(f.arg::<i32>(0)?)))
            .param("n", TypeId::I32)
            .returns(TypeId::I32)
            .as_static(),
    )
    .method(
        MethodDefinition::new("TestStaticMethodB", concat)
            .param("s", TypeId::STRING)
            .param("n", TypeId::I32)
            .returns(TypeId::STRING)
            .as_static(),
    )
    .method(
        MethodDefinition::new("TestMethodA", |f| Ok(Value::I32(f.arg::<i32>(0)?)))
            .param("n", TypeId::I32)
            .returns(TypeId::I32),
    )
    .method(
        MethodDefinition::new("TestMethodB", concat)
            .param("s", TypeId::STRING)
            .param("n", TypeId::I32)
            .returns(TypeId::STRING),
    )
    .method(
        MethodDefinition::new("Throw", |f| {
            Err(CallError::Failed(format!("refusing {}", f.arg::<String>(0)?)))
        })
        .param("reason", TypeId::STRING)
        .returns(TypeId::I32)
        .as_static(),
    )
    .method(
        MethodDefinition::new("Crash", |_| -> CallResult<Value> { panic!("crashed on purpose") })
            .as_static(),
    )
    .method(
        MethodDefinition::new("OnlyValues", |f| Ok(Value::Type(f.type_arg(0)?)))
            .generic_param(GenericParam::new("T").value_kind())
            .returns(TypeId::OBJECT)
            .as_static(),
    )
    .method(
        MethodDefinition::new("OnlyReferences", |f| Ok(Value::Type(f.type_arg(0)?)))
            .generic_param(GenericParam::new("T").reference_kind())
            .returns(TypeId::OBJECT)
            .as_static(),
    )
}

pub fn fixture() -> Fixture {
    let mut b = CatalogBuilder::new();
    let collections = b.module("collections");
    let tests = b.module("tests");

    // collections: List<T>, Dictionary<K, V>
    let list = b.define(TypeDefinition::class("List", collections).generic_param("T")).unwrap();
    let t = b.generic_params(list)[0];
    b.add_member(list, FieldDefinition::property("Count", TypeId::I32)).unwrap();
    b.add_member(
        list,
        MethodDefinition::new("Get", |_| Ok(Value::Null))
            .param("index", TypeId::I32)
            .returns(t),
    )
    .unwrap();
    let dictionary = b
        .define(
            TypeDefinition::class("Dictionary", collections)
                .generic_param("K")
                .generic_param("V"),
        )
        .unwrap();
    let list_i32 = b.instantiate(list, &[TypeId::I32]).unwrap();
    let dict_i32_string = b.instantiate(dictionary, &[TypeId::I32, TypeId::STRING]).unwrap();
    let dict_string_i32 = b.instantiate(dictionary, &[TypeId::STRING, TypeId::I32]).unwrap();
    let i32_array = b.array_of(TypeId::I32).unwrap();

    // tests
    let test_class = b
        .define(
            test_class_methods(TypeDefinition::class("TestClass", tests))
                .bind::<TestClass>()
                .annotate(AttributeA("test-class"))
                .annotate(DerivedAttributeA)
                .annotate(LocalOnly(1))
                .field(
                    FieldDefinition::new("name", TypeId::STRING)
                        .annotate(AttributeA("name-field"))
                        .annotate(AttributeA("name-field-again")),
                )
                .field(FieldDefinition::property("Size", TypeId::I32).annotate(AttributeB)),
        )
        .unwrap();
    let derived_a = b
        .define(
            TypeDefinition::class("TestClassDerivedA", tests)
                .extends(test_class)
                .annotate(AttributeA("derived-a"))
                .annotate(AttributeB),
        )
        .unwrap();
    let derived_b = b
        .define(TypeDefinition::class("TestClassDerivedB", tests).extends(test_class))
        .unwrap();
    let derived_c = b
        .define(TypeDefinition::class("TestClassDerivedC", tests).extends(derived_a))
        .unwrap();
    let derived_d = b
        .define(
            TypeDefinition::class("TestClassDerivedD", tests)
                .extends(test_class)
                .as_abstract(),
        )
        .unwrap();
    let test_struct = b.define(TypeDefinition::structure("TestStruct", tests)).unwrap();
    let test_enum = b.define(TypeDefinition::enumeration("TestEnum", tests)).unwrap();
    let test_container = b
        .define(TypeDefinition::class("TestContainer", tests).extends(list_i32))
        .unwrap();
    let interface = b
        .define(TypeDefinition::interface("ITestInterface", tests).bind::<ITestInterface>())
        .unwrap();
    let interface_derived = b
        .define(TypeDefinition::interface("ITestInterfaceDerived", tests).implements(interface))
        .unwrap();
    let class_c = b
        .define(
            TypeDefinition::class("TestClassC", tests)
                .generic_param("T1")
                .generic_param("T2")
                .generic_param("T3"),
        )
        .unwrap();
    let class_c_closed = b
        .instantiate(class_c, &[TypeId::I32, TypeId::STRING, TypeId::BOOL])
        .unwrap();
    let class_c_derived = b
        .define(TypeDefinition::class("TestClassCDerived", tests).extends(class_c_closed))
        .unwrap();

    let counter = b
        .define(
            TypeDefinition::class("Counter", tests)
                .bind::<Counter>()
                .method(
                    MethodDefinition::new("Add", |f| {
                        *f.receiver::<Mutex<i64>>()?.lock() += i64::from(f.arg::<i32>(0)?);
                        Ok(Value::Null)
                    })
                    .param("by", TypeId::I32),
                )
                .method(
                    MethodDefinition::new("Get", |f| Ok(Value::I64(*f.receiver::<Mutex<i64>>()?.lock())))
                        .returns(TypeId::I64),
                ),
        )
        .unwrap();

    Fixture {
        catalog: Arc::new(b.build().unwrap()),
        tests,
        collections,
        test_class,
        derived_a,
        derived_b,
        derived_c,
        derived_d,
        test_struct,
        test_enum,
        test_container,
        interface,
        interface_derived,
        class_c,
        class_c_derived,
        counter,
        list,
        list_i32,
        dictionary,
        dict_i32_string,
        dict_string_i32,
        i32_array,
    }
}
