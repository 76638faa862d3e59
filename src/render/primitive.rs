//! Prozedurales Primitiv-Rig: vier sich verjüngende Link-Quader,
//! Grundplatte, Schultergehäuse, Gelenk-Scheiben, Servo-Blöcke,
//! Greifergruppe und Zielmarker.

use glam::{Quat, Vec3};

use crate::config::HeroConfig;
use crate::core::fk::FkResult;
use crate::render::engine::{MaterialSpec, MeshId, MeshShape, MeshSpec, SceneEngine, Transform};

const HOUSING_COLOR: [f32; 4] = [0.122, 0.184, 0.286, 1.0];
const BASE_PLATE_COLOR: [f32; 4] = [0.067, 0.11, 0.184, 1.0];

/// Breite/Tiefe der vier Link-Quader, von der Säule zum Greifer verjüngt.
const SEGMENT_PROFILES: [(f32, f32); 4] = [(0.2, 0.18), (0.17, 0.15), (0.14, 0.12), (0.11, 0.1)];

/// Radius/Höhe der Gelenk-Scheiben.
const JOINT_PROFILES: [(f32, f32); 4] = [(0.095, 0.085), (0.085, 0.08), (0.078, 0.074), (0.068, 0.07)];

/// Kantenlängen der Servo-Blöcke an Schulter, Ellbogen und Handgelenk.
const SERVO_PROFILES: [(f32, f32, f32); 3] = [(0.24, 0.12, 0.18), (0.21, 0.11, 0.16), (0.19, 0.1, 0.14)];

const FINGER_OFFSETS: [Vec3; 2] = [Vec3::new(-0.03, 0.08, 0.0), Vec3::new(0.03, 0.08, 0.0)];

/// Handles aller Rig-Meshes. Links sind Einheitshöhen-Quader, die pro Frame
/// per `place_segment` gestreckt und ausgerichtet werden; Grundplatte und
/// Schultergehäuse stehen fest an der Basis.
#[derive(Debug)]
pub struct PrimitiveRig {
    segments: [MeshId; 4],
    joints: [MeshId; 4],
    servos: [MeshId; 3],
    base_plate: MeshId,
    shoulder_housing: MeshId,
    gripper_palm: MeshId,
    fingers: [MeshId; 2],
    target_marker: MeshId,
}

impl PrimitiveRig {
    /// Legt alle Meshes des Rigs in der Szene an.
    pub fn build(engine: &mut dyn SceneEngine, config: &HeroConfig) -> Self {
        let theme = &config.theme;
        let link_material = MaterialSpec::standard(theme.link, 0.46, 0.16);
        let joint_material = MaterialSpec::standard(theme.joint, 0.38, 0.22);
        let housing_material = MaterialSpec::standard(HOUSING_COLOR, 0.5, 0.12);
        let effector_material = MaterialSpec::standard(theme.effector, 0.48, 0.18);

        let segments = SEGMENT_PROFILES.map(|(width, depth)| {
            engine.add_mesh(&MeshSpec {
                shape: MeshShape::Box {
                    width,
                    height: 1.0,
                    depth,
                },
                material: link_material,
            })
        });

        let joints = JOINT_PROFILES.map(|(radius, height)| {
            engine.add_mesh(&MeshSpec {
                shape: MeshShape::Cylinder {
                    radius_top: radius,
                    radius_bottom: radius,
                    height,
                },
                material: joint_material,
            })
        });

        let servos = SERVO_PROFILES.map(|(width, height, depth)| {
            engine.add_mesh(&MeshSpec {
                shape: MeshShape::Box {
                    width,
                    height,
                    depth,
                },
                material: housing_material,
            })
        });

        let base = Vec3::from_array(config.base_position);
        let base_plate = engine.add_mesh(&MeshSpec {
            shape: MeshShape::Cylinder {
                radius_top: 0.24,
                radius_bottom: 0.28,
                height: 0.12,
            },
            material: MaterialSpec::standard(BASE_PLATE_COLOR, 0.62, 0.2),
        });
        engine.set_transform(
            base_plate,
            Transform::from_translation(base + Vec3::new(0.0, -0.06, 0.0)),
        );

        let shoulder_housing = engine.add_mesh(&MeshSpec {
            shape: MeshShape::Box {
                width: 0.34,
                height: 0.16,
                depth: 0.25,
            },
            material: housing_material,
        });
        engine.set_transform(
            shoulder_housing,
            Transform::from_translation(base + Vec3::new(0.0, 0.07, 0.0)),
        );

        let gripper_palm = engine.add_mesh(&MeshSpec {
            shape: MeshShape::Box {
                width: 0.1,
                height: 0.08,
                depth: 0.12,
            },
            material: effector_material,
        });
        let fingers = [0, 1].map(|_| {
            engine.add_mesh(&MeshSpec {
                shape: MeshShape::Box {
                    width: 0.025,
                    height: 0.12,
                    depth: 0.03,
                },
                material: joint_material,
            })
        });

        let target_marker = engine.add_mesh(&MeshSpec {
            shape: MeshShape::Sphere { radius: 0.045 },
            material: MaterialSpec::emissive(theme.target, 0.18, 0.3, 0.28),
        });

        Self {
            segments,
            joints,
            servos,
            base_plate,
            shoulder_housing,
            gripper_palm,
            fingers,
            target_marker,
        }
    }

    /// Stellt das Rig auf das FK-Ergebnis und den aktuellen Zielpunkt.
    pub fn pose_from_fk(&self, engine: &mut dyn SceneEngine, fk: &FkResult, target: Vec3) {
        for (mesh, (start, end)) in self.segments.iter().zip(fk.segments.iter()) {
            if let Some(transform) = place_segment(*start, *end) {
                engine.set_transform(*mesh, transform);
            }
        }

        // Gelenk-Scheiben liegen quer zur Armebene.
        let puck_rotation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        for (mesh, position) in self.joints.iter().zip(fk.joint_positions.iter()) {
            engine.set_transform(
                *mesh,
                Transform {
                    translation: *position,
                    rotation: puck_rotation,
                    ..Transform::default()
                },
            );
        }

        let servo_lifts = [0.02, 0.02, 0.018];
        for i in 0..3 {
            let position = fk.joint_positions[i + 1] + Vec3::new(0.0, servo_lifts[i], 0.0);
            engine.set_transform(self.servos[i], Transform::from_translation(position));
        }

        // Die Greifergruppe sitzt am Handgelenk-Segmentende und richtet sich
        // an dessen Richtung aus; die Finger-Offsets drehen mit.
        let (wrist, tip) = fk.segments[3];
        let direction = tip - wrist;
        if direction.length_squared() > 1e-9 {
            let rotation = Quat::from_rotation_arc(Vec3::Y, direction.normalize());
            engine.set_transform(
                self.gripper_palm,
                Transform {
                    translation: tip,
                    rotation,
                    ..Transform::default()
                },
            );
            for (mesh, offset) in self.fingers.iter().zip(FINGER_OFFSETS.iter()) {
                engine.set_transform(
                    *mesh,
                    Transform {
                        translation: tip + rotation * *offset,
                        rotation,
                        ..Transform::default()
                    },
                );
            }
        }

        engine.set_transform(self.target_marker, Transform::from_translation(target));
    }

    /// Entfernt alle Meshes des Rigs aus der Szene.
    pub fn dispose(&self, engine: &mut dyn SceneEngine) {
        for mesh in self.all_meshes() {
            engine.remove_mesh(mesh);
        }
    }

    /// Blendet das gesamte Rig ein oder aus.
    pub fn set_visible(&self, engine: &mut dyn SceneEngine, visible: bool) {
        for mesh in self.all_meshes() {
            engine.set_visible(mesh, visible);
        }
    }

    fn all_meshes(&self) -> impl Iterator<Item = MeshId> {
        self.segments
            .into_iter()
            .chain(self.joints)
            .chain(self.servos)
            .chain([self.base_plate, self.shoulder_housing, self.gripper_palm])
            .chain(self.fingers)
            .chain([self.target_marker])
    }
}

/// Transform eines Einheitshöhen-Meshes (+Y) auf die Strecke `start`→`end`:
/// Mittelpunkt, Ausrichtung per Rotationsbogen, Y-Skalierung auf die
/// Streckenlänge. `None` bei degenerierter Strecke.
pub fn place_segment(start: Vec3, end: Vec3) -> Option<Transform> {
    let offset = end - start;
    let length = offset.length();
    if length < 1e-5 {
        return None;
    }
    Some(Transform {
        translation: start + offset * 0.5,
        rotation: Quat::from_rotation_arc(Vec3::Y, offset / length),
        scale: Vec3::new(1.0, length, 1.0),
    })
}
