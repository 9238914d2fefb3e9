use std::{f32::consts::FRAC_PI_2, rc::Rc};

use cgmath::{Euler, InnerSpace, Matrix4, Rad, SquareMatrix, Vector3, Vector4};
use matcap_scene::{
    data_structures::{
        instance::{InstanceRaw, Transform},
        material::{MatcapId, MatcapMaterial},
        scene_graph::{ContainerNode, MeshNode, SceneGraph, SceneNode},
    },
    geometry::{GeometryKind, primitives},
    render::batch_renderables,
};

fn close(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
    let a: [[f32; 4]; 4] = a.into();
    let b: [[f32; 4]; 4] = b.into();
    a.iter().flatten().zip(b.iter().flatten()).all(|(x, y)| (x - y).abs() < 1e-5)
}

#[test]
fn rotation_is_applied_in_xyz_order() {
    let transform = Transform {
        position: Vector3::new(1.0, 2.0, 3.0),
        rotation: Euler::new(Rad(0.3), Rad(1.1), Rad(-0.7)),
        scale: Vector3::new(2.0, 2.0, 2.0),
    };
    let expected = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0))
        * Matrix4::from_angle_x(Rad(0.3))
        * Matrix4::from_angle_y(Rad(1.1))
        * Matrix4::from_angle_z(Rad(-0.7))
        * Matrix4::from_scale(2.0);
    assert!(close(transform.to_matrix(), expected));
}

#[test]
fn world_transform_composes_parent_and_child() {
    let material = MatcapMaterial::new(MatcapId::new(0)).shared();
    let cuboid = Rc::new(primitives::cuboid(1.0, 1.0, 1.0));

    let mut group = ContainerNode::new(Transform {
        rotation: Euler::new(Rad(0.0), Rad(FRAC_PI_2), Rad(0.0)),
        ..Transform::from(Vector3::new(1.0, 0.0, 0.0))
    });
    group.add_child(Box::new(MeshNode::new(
        cuboid,
        material,
        Transform::from(Vector3::new(0.0, 0.0, 2.0)),
    )));

    let mut scene = SceneGraph::new();
    scene.add(Box::new(group));

    let renderables = scene.renderables();
    assert_eq!(renderables.len(), 1);
    // a quarter turn around Y maps +Z onto +X
    let origin = renderables[0].world * Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!((origin.truncate() - Vector3::new(3.0, 0.0, 0.0)).magnitude() < 1e-5);
}

#[test]
fn only_mesh_nodes_are_counted() {
    let material = MatcapMaterial::new(MatcapId::new(0)).shared();
    let sphere = Rc::new(primitives::sphere(0.25, 8, 4));

    let mut scene = SceneGraph::new();
    assert_eq!(scene.renderable_count(), 0);

    let mut group = ContainerNode::default();
    let mut parent = MeshNode::new(Rc::clone(&sphere), Rc::clone(&material), Transform::default());
    parent.add_child(Box::new(MeshNode::new(
        Rc::clone(&sphere),
        Rc::clone(&material),
        Transform::default(),
    )));
    group.add_child(Box::new(parent));
    group.add_child(Box::new(ContainerNode::default()));
    scene.add(Box::new(group));
    scene.add(Box::new(MeshNode::new(sphere, material, Transform::default())));

    assert_eq!(scene.renderable_count(), 3);
    assert_eq!(scene.renderables().len(), 3);
}

#[test]
fn normal_matrix_survives_zero_scale() {
    let world = Transform::default().with_uniform_scale(0.0).to_matrix();
    let raw: [f32; 25] = bytemuck::cast(InstanceRaw::from_world(&world));
    assert!(raw.iter().all(|v| v.is_finite()));
    assert_eq!(&raw[16..], &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn instance_keeps_the_world_matrix() {
    let world = Transform::from(Vector3::new(4.0, -1.0, 0.5)).with_uniform_scale(0.25).to_matrix();
    let raw = InstanceRaw::from_world(&world);
    assert!(close(raw.model(), world));
    assert!(close(InstanceRaw::from_world(&Matrix4::identity()).model(), Matrix4::identity()));
}

#[test]
fn batches_group_by_geometry_and_matcap() {
    let gold = MatcapMaterial::new(MatcapId::new(7)).shared();
    let grey = MatcapMaterial::new(MatcapId::new(0)).shared();
    let torus = Rc::new(primitives::torus(0.3, 0.2, 8, 12));
    let cuboid = Rc::new(primitives::cuboid(0.5, 0.5, 0.5));
    let empty = Rc::new(matcap_scene::geometry::Geometry::new(GeometryKind::Text, vec![], vec![]));

    let mut scene = SceneGraph::new();
    for (geometry, material) in [
        (&torus, &gold),
        (&cuboid, &gold),
        (&torus, &gold),
        (&torus, &grey),
        (&empty, &gold),
    ] {
        scene.add(Box::new(MeshNode::new(
            Rc::clone(geometry),
            Rc::clone(material),
            Transform::default(),
        )));
    }

    let batches = batch_renderables(&scene.renderables());
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[&(GeometryKind::Torus, MatcapId::new(7))].len(), 2);
    assert_eq!(batches[&(GeometryKind::Torus, MatcapId::new(0))].len(), 1);
    assert_eq!(batches[&(GeometryKind::Box, MatcapId::new(7))].len(), 1);

    grey.borrow_mut().set_matcap(MatcapId::new(7));
    let batches = batch_renderables(&scene.renderables());
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[&(GeometryKind::Torus, MatcapId::new(7))].len(), 3);
}
